use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
};
use regex::Regex;
use unicode_width::UnicodeWidthChar;

use crate::{
    app::input::KeyInput,
    error::DialogResult,
    presentation::{Display, OverlayFrame, WindowId},
};

/// An editable text field drawn in reverse video inside a frame.
///
/// The field grows past its visible size in both directions; rows beyond
/// the first exist only when the field was created with more than one
/// visible row.
#[derive(Debug)]
pub struct TextField {
    display: Display,
    window: Option<WindowId>,
    rows: Vec<Vec<char>>,
    cursor_row: usize,
    cursor_col: usize,
    top_row: usize,
    left_col: usize,
    multiline: bool,
    editable: bool,
    changed: bool,
    pattern: Option<Regex>,
}

impl TextField {
    pub fn new(
        frame: &OverlayFrame,
        lines: u16,
        columns: u16,
        y: u16,
        x: u16,
    ) -> DialogResult<Self> {
        let window = frame.derive(lines, columns, y, x)?;
        let field = Self {
            display: frame.display().clone(),
            window: Some(window),
            rows: vec![Vec::new()],
            cursor_row: 0,
            cursor_col: 0,
            top_row: 0,
            left_col: 0,
            multiline: lines > 1,
            editable: true,
            changed: false,
            pattern: None,
        };
        field.refresh();
        Ok(field)
    }

    /// Only content matching `pattern` passes [`TextField::validate`].
    pub fn set_pattern(&mut self, pattern: Regex) {
        self.pattern = Some(pattern);
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Replaces the content and puts the cursor at the start. The field
    /// counts as unchanged afterwards.
    pub fn set_text(&mut self, text: &str) {
        self.rows = if self.multiline {
            text.split('\n').map(|row| row.chars().collect()).collect()
        } else {
            vec![text.chars().filter(|ch| *ch != '\n').collect()]
        };
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.top_row = 0;
        self.left_col = 0;
        self.changed = false;
        self.refresh();
    }

    /// Content with rows joined by newlines.
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn rows(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.iter().collect()).collect()
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    /// Whether the user has edited the field since it was last filled.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Content that was never edited always passes.
    pub fn validate(&self) -> bool {
        if !self.changed {
            return true;
        }
        match &self.pattern {
            Some(pattern) => pattern.is_match(&self.text()),
            None => true,
        }
    }

    /// Applies one key. Returns whether the content changed.
    pub fn handle_key(&mut self, key: KeyInput) -> bool {
        let edited = match key {
            KeyInput::Left => {
                self.move_left();
                false
            }
            KeyInput::Right => {
                self.move_right();
                false
            }
            KeyInput::Up => {
                if self.cursor_row > 0 {
                    self.cursor_row -= 1;
                    self.clamp_col();
                }
                false
            }
            KeyInput::Down => {
                if self.cursor_row + 1 < self.rows.len() {
                    self.cursor_row += 1;
                    self.clamp_col();
                }
                false
            }
            KeyInput::Enter => self.editable && self.new_line(),
            KeyInput::Backspace => self.editable && self.delete_previous(),
            KeyInput::Char(ch) if self.editable => {
                self.rows[self.cursor_row].insert(self.cursor_col, ch);
                self.cursor_col += 1;
                true
            }
            _ => false,
        };
        if edited {
            self.changed = true;
        }
        self.scroll_to_cursor();
        self.refresh();
        self.focus();
        edited
    }

    /// Makes this the field receiving input by moving the terminal cursor
    /// into it.
    pub fn focus(&self) {
        if let Some(area) = self.area() {
            let y = self.cursor_row - self.top_row;
            let x = self.span_width(self.left_col, self.cursor_col);
            if let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y))
                && x < area.width
                && y < area.height
            {
                self.display
                    .set_cursor(Some(Position::new(area.x + x, area.y + y)));
            }
        }
    }

    pub fn refresh(&self) {
        let Some(window) = self.window else {
            return;
        };
        let style = Style::default().add_modifier(Modifier::REVERSED);
        self.display.paint(window, |area, buf| {
            buf.set_style(area, style);
            for line in 0..area.height {
                let y = area.y + line;
                let text: String = self
                    .rows
                    .get(self.top_row + usize::from(line))
                    .map(|row| row.iter().skip(self.left_col).collect())
                    .unwrap_or_default();
                let padded = format!("{text:<width$}", width = usize::from(area.width));
                buf.set_stringn(area.x, y, padded, usize::from(area.width), style);
            }
        });
    }

    fn area(&self) -> Option<Rect> {
        self.window.and_then(|window| self.display.window_area(window))
    }

    fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.rows[self.cursor_row].len();
        }
    }

    fn move_right(&mut self) {
        if self.cursor_col < self.rows[self.cursor_row].len() {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.rows.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    fn new_line(&mut self) -> bool {
        if !self.multiline {
            return false;
        }
        let tail = self.rows[self.cursor_row].split_off(self.cursor_col);
        self.cursor_row += 1;
        self.cursor_col = 0;
        self.rows.insert(self.cursor_row, tail);
        true
    }

    fn delete_previous(&mut self) -> bool {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
            self.rows[self.cursor_row].remove(self.cursor_col);
            true
        } else if self.cursor_row > 0 {
            let current = self.rows.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.rows[self.cursor_row].len();
            self.rows[self.cursor_row].extend(current);
            true
        } else {
            false
        }
    }

    fn clamp_col(&mut self) {
        self.cursor_col = self.cursor_col.min(self.rows[self.cursor_row].len());
    }

    fn scroll_to_cursor(&mut self) {
        let Some(area) = self.area() else {
            return;
        };
        let height = usize::from(area.height.max(1));
        let width = usize::from(area.width.max(1));
        if self.cursor_row < self.top_row {
            self.top_row = self.cursor_row;
        } else if self.cursor_row >= self.top_row + height {
            self.top_row = self.cursor_row + 1 - height;
        }
        if self.cursor_col < self.left_col {
            self.left_col = self.cursor_col;
        }
        while self.left_col < self.cursor_col
            && self.span_width(self.left_col, self.cursor_col) >= width
        {
            self.left_col += 1;
        }
    }

    /// Display columns taken by the cursor row between two char indices.
    fn span_width(&self, from: usize, to: usize) -> usize {
        self.rows[self.cursor_row]
            .get(from..to)
            .unwrap_or_default()
            .iter()
            .map(|ch| ch.width().unwrap_or(0))
            .sum()
    }
}

impl Drop for TextField {
    fn drop(&mut self) {
        if let Some(window) = self.window.take() {
            self.display.release_window(window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_field(lines: u16, check: impl FnOnce(&mut TextField)) {
        let display = Display::new(Rect::new(0, 0, 80, 24));
        let frame = OverlayFrame::create(&display, "t", 12, 30, 0, 0).unwrap();
        let mut field = TextField::new(&frame, lines, 10, 1, 1).unwrap();
        check(&mut field);
    }

    fn type_text(field: &mut TextField, text: &str) {
        for ch in text.chars() {
            field.handle_key(KeyInput::Char(ch));
        }
    }

    #[test]
    fn typing_inserts_at_cursor() {
        with_field(1, |field| {
            type_text(field, "hllo");
            for _ in 0..3 {
                field.handle_key(KeyInput::Left);
            }
            field.handle_key(KeyInput::Char('e'));
            assert_eq!(field.text(), "hello");
            assert!(field.is_changed());
        });
    }

    #[test]
    fn backspace_deletes_before_cursor() {
        with_field(1, |field| {
            field.set_text("abc");
            assert!(!field.handle_key(KeyInput::Backspace), "nothing before start");
            field.handle_key(KeyInput::Right);
            field.handle_key(KeyInput::Right);
            assert!(field.handle_key(KeyInput::Backspace));
            assert_eq!(field.text(), "ac");
            assert_eq!(field.cursor(), (0, 1));
        });
    }

    #[test]
    fn enter_splits_rows_only_in_multiline_fields() {
        with_field(1, |field| {
            type_text(field, "ab");
            assert!(!field.handle_key(KeyInput::Enter));
            assert_eq!(field.rows(), vec!["ab"]);
        });
        with_field(5, |field| {
            type_text(field, "ab");
            field.handle_key(KeyInput::Left);
            field.handle_key(KeyInput::Enter);
            assert_eq!(field.rows(), vec!["a", "b"]);
            assert_eq!(field.cursor(), (1, 0));
            field.handle_key(KeyInput::Backspace);
            assert_eq!(field.rows(), vec!["ab"]);
        });
    }

    #[test]
    fn vertical_movement_clamps_column() {
        with_field(5, |field| {
            field.set_text("long line\nx\n");
            for _ in 0..6 {
                field.handle_key(KeyInput::Right);
            }
            field.handle_key(KeyInput::Down);
            assert_eq!(field.cursor(), (1, 1));
            field.handle_key(KeyInput::Down);
            field.handle_key(KeyInput::Down);
            assert_eq!(field.cursor(), (2, 0));
        });
    }

    #[test]
    fn validation_only_applies_to_edited_content() {
        with_field(1, |field| {
            field.set_pattern(Regex::new("^[0-9]+$").unwrap());
            field.set_text("not a number");
            assert!(field.validate(), "prefilled content is trusted");
            field.handle_key(KeyInput::Char('!'));
            assert!(!field.validate());
            field.set_text("12");
            field.handle_key(KeyInput::Right);
            field.handle_key(KeyInput::Right);
            field.handle_key(KeyInput::Char('3'));
            assert!(field.validate());
        });
    }

    #[test]
    fn read_only_field_allows_cursor_motion_only() {
        with_field(1, |field| {
            field.set_text("name");
            field.set_editable(false);
            field.handle_key(KeyInput::Right);
            assert!(!field.handle_key(KeyInput::Char('x')));
            assert!(!field.handle_key(KeyInput::Backspace));
            assert_eq!(field.text(), "name");
            assert_eq!(field.cursor(), (0, 1));
            assert!(!field.is_changed());
        });
    }

    #[test]
    fn cursor_tracks_display_columns_of_wide_chars() {
        with_field(1, |field| {
            type_text(field, "日本");
            let area = field.area().unwrap();
            let cursor = field.display.cursor().unwrap();
            assert_eq!(cursor.x - area.x, 4);
            assert_eq!(field.cursor(), (0, 2));
        });
    }

    #[test]
    fn wide_chars_scroll_before_overflowing() {
        with_field(1, |field| {
            type_text(field, "日本語の入力です");
            let area = field.area().unwrap();
            let cursor = field.display.cursor().unwrap();
            assert!(cursor.x < area.right());
            assert_eq!(cursor.x - area.x, 8);
            assert_eq!(field.text(), "日本語の入力です");
        });
    }

    #[test]
    fn long_input_scrolls_horizontally() {
        with_field(1, |field| {
            type_text(field, "0123456789abcdef");
            assert_eq!(field.text(), "0123456789abcdef");
            let cursor = field.display.cursor().unwrap();
            let area = field.area().unwrap();
            assert!(cursor.x < area.right());
        });
    }
}
