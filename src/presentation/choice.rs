use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    widgets::{Clear, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::input::KeyInput,
    error::{DialogError, DialogResult},
};

use super::{
    display::{Display, WindowId},
    frame::OverlayFrame,
};

pub const DEFAULT_MARK: &str = "* ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceLayout {
    /// Every item on one line.
    Row,
    /// Items fill rows of `columns` entries; Up/Down move between rows.
    Grid { columns: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChoiceItem {
    label: String,
    tag: i32,
}

/// A selectable list of labelled items, each carrying a caller-chosen tag.
#[derive(Debug)]
pub struct ChoiceList {
    display: Display,
    window: Option<WindowId>,
    items: Vec<ChoiceItem>,
    layout: ChoiceLayout,
    current: usize,
    marked: bool,
    top_row: usize,
    mark: String,
}

impl ChoiceList {
    /// Builds a single-row list on the last line of the frame's content
    /// region. Items are tagged with their position until retagged.
    pub fn attach(frame: &OverlayFrame, labels: &[&str]) -> DialogResult<Self> {
        let content = frame
            .content_area()
            .ok_or(DialogError::Allocation("menu window"))?;
        let columns = content.width.saturating_sub(1).max(1);
        Self::attach_at(
            frame,
            labels,
            ChoiceLayout::Row,
            Rect::new(0, content.height.saturating_sub(1), columns, 1),
        )
    }

    /// Builds a list inside `region`, given relative to the frame's content.
    pub fn attach_at(
        frame: &OverlayFrame,
        labels: &[&str],
        layout: ChoiceLayout,
        region: Rect,
    ) -> DialogResult<Self> {
        if labels.is_empty() {
            return Err(DialogError::Allocation("menu items"));
        }
        let window = frame.derive(region.height, region.width, region.y, region.x)?;
        let list = Self {
            display: frame.display().clone(),
            window: Some(window),
            items: labels
                .iter()
                .zip(0..)
                .map(|(label, tag)| ChoiceItem {
                    label: (*label).to_string(),
                    tag,
                })
                .collect(),
            layout,
            current: 0,
            marked: false,
            top_row: 0,
            mark: DEFAULT_MARK.to_string(),
        };
        list.refresh();
        Ok(list)
    }

    pub fn with_mark(mut self, mark: impl Into<String>) -> Self {
        self.mark = mark.into();
        self.refresh();
        self
    }

    /// Replaces the tags of the first `tags.len()` items.
    pub fn with_tags(mut self, tags: &[i32]) -> Self {
        for (item, tag) in self.items.iter_mut().zip(tags) {
            item.tag = *tag;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Tag of the highlighted item.
    pub fn current_tag(&self) -> i32 {
        self.items[self.current].tag
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Interprets one key. Only Enter resolves, yielding the highlighted
    /// item's tag; everything else leaves the list unresolved.
    pub fn drive(&mut self, key: KeyInput) -> Option<i32> {
        let columns = self.columns();
        let index = self.current;
        let target = match key {
            KeyInput::Enter => return Some(self.current_tag()),
            KeyInput::Left if index % columns > 0 => Some(index - 1),
            KeyInput::Right if index % columns + 1 < columns && index + 1 < self.len() => {
                Some(index + 1)
            }
            KeyInput::Up
                if matches!(self.layout, ChoiceLayout::Grid { .. }) && index >= columns =>
            {
                Some(index - columns)
            }
            KeyInput::Down
                if matches!(self.layout, ChoiceLayout::Grid { .. })
                    && index + columns < self.len() =>
            {
                Some(index + columns)
            }
            _ => None,
        };
        if key.is_movement() {
            self.select(target.unwrap_or(index));
        }
        None
    }

    /// Highlights the first item.
    pub fn first(&mut self) {
        self.select(0);
    }

    /// Parks the terminal cursor on the highlighted item.
    pub fn focus(&self) {
        if let Some(area) = self.area() {
            let (row, x) = self.item_origin(self.current);
            let y = row.saturating_sub(self.top_row);
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
        let item_width = self.item_width();
        let rows = self.area().map(|area| usize::from(area.height)).unwrap_or(1);
        let top_row = self.top_row;
        let current = self.current;
        let marked = self.marked;
        let columns = self.columns();
        let blank = " ".repeat(self.mark.width());
        self.display.paint(window, |area, buf| {
            Clear.render(area, buf);
            for (index, item) in self.items.iter().enumerate() {
                let row = index / columns;
                if row < top_row || row >= top_row + rows {
                    continue;
                }
                let x = (index % columns) * (item_width + 1);
                if x >= usize::from(area.width) {
                    continue;
                }
                let highlighted = marked && index == current;
                let prefix = if highlighted { self.mark.as_str() } else { blank.as_str() };
                let style = if highlighted {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                let text = format!("{prefix}{}", item.label);
                buf.set_stringn(
                    area.x + x as u16,
                    area.y + (row - top_row) as u16,
                    text,
                    usize::from(area.width) - x,
                    style,
                );
            }
        });
    }

    fn select(&mut self, index: usize) {
        self.current = index.min(self.len().saturating_sub(1));
        self.marked = true;
        let rows = self.area().map(|area| usize::from(area.height.max(1))).unwrap_or(1);
        let row = self.current / self.columns();
        if row < self.top_row {
            self.top_row = row;
        } else if row >= self.top_row + rows {
            self.top_row = row + 1 - rows;
        }
        self.refresh();
    }

    fn columns(&self) -> usize {
        match self.layout {
            ChoiceLayout::Row => self.items.len().max(1),
            ChoiceLayout::Grid { columns } => columns.max(1),
        }
    }

    fn item_width(&self) -> usize {
        let widest = self
            .items
            .iter()
            .map(|item| item.label.width())
            .max()
            .unwrap_or(0);
        widest + self.mark.width()
    }

    fn item_origin(&self, index: usize) -> (usize, usize) {
        let columns = self.columns();
        (index / columns, (index % columns) * (self.item_width() + 1))
    }

    fn area(&self) -> Option<Rect> {
        self.window.and_then(|window| self.display.window_area(window))
    }
}

impl Drop for ChoiceList {
    fn drop(&mut self) {
        if let Some(window) = self.window.take() {
            self.display.release_window(window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(display: &Display) -> OverlayFrame {
        OverlayFrame::create(display, "Pick", 8, 30, 0, 0).unwrap()
    }

    fn display() -> Display {
        Display::new(Rect::new(0, 0, 80, 24))
    }

    #[test]
    fn enter_resolves_first_item_before_navigation() {
        let display = display();
        let frame = frame(&display);
        let mut list = ChoiceList::attach(&frame, &["Ok", "Cancel"]).unwrap();
        assert!(!list.is_marked());
        assert_eq!(list.drive(KeyInput::Enter), Some(0));
    }

    #[test]
    fn non_confirm_keys_never_resolve() {
        let display = display();
        let frame = frame(&display);
        let mut list = ChoiceList::attach(&frame, &["Ok", "Cancel", "Resize"]).unwrap();
        let keys = [
            KeyInput::Right,
            KeyInput::Char('x'),
            KeyInput::Tab,
            KeyInput::Down,
            KeyInput::Right,
            KeyInput::Backspace,
            KeyInput::Left,
            KeyInput::Up,
            KeyInput::Ignored,
            KeyInput::BackTab,
        ];
        for key in keys {
            assert_eq!(list.drive(key), None, "{key:?} must not resolve");
        }
    }

    #[test]
    fn row_movement_stops_at_edges() {
        let display = display();
        let frame = frame(&display);
        let mut list = ChoiceList::attach(&frame, &["Ok", "Cancel"]).unwrap();
        list.drive(KeyInput::Left);
        assert_eq!(list.current_index(), 0);
        assert!(list.is_marked());
        list.drive(KeyInput::Right);
        list.drive(KeyInput::Right);
        assert_eq!(list.current_index(), 1);
        list.drive(KeyInput::Down);
        assert_eq!(list.current_index(), 1, "rows ignore vertical movement");
    }

    #[test]
    fn grid_moves_vertically_without_wrap() {
        let display = display();
        let frame = frame(&display);
        let mut list = ChoiceList::attach_at(
            &frame,
            &["a", "b", "c", "d", "e"],
            ChoiceLayout::Grid { columns: 1 },
            Rect::new(0, 0, 10, 3),
        )
        .unwrap()
        .with_tags(&[10, 20, 30, 40, 50]);
        list.drive(KeyInput::Up);
        assert_eq!(list.current_tag(), 10);
        for _ in 0..10 {
            list.drive(KeyInput::Down);
        }
        assert_eq!(list.current_tag(), 50);
        assert_eq!(list.drive(KeyInput::Enter), Some(50));
    }

    #[test]
    fn first_resets_highlight() {
        let display = display();
        let frame = frame(&display);
        let mut list = ChoiceList::attach(&frame, &["Ok", "Cancel"]).unwrap();
        list.drive(KeyInput::Right);
        list.first();
        assert_eq!(list.current_tag(), 0);
    }

    #[test]
    fn empty_label_list_is_rejected() {
        let display = display();
        let frame = frame(&display);
        assert!(ChoiceList::attach(&frame, &[]).is_err());
        assert_eq!(display.live_handles(), 3, "only the frame remains");
    }

    #[test]
    fn dropping_releases_menu_window() {
        let display = display();
        let frame = frame(&display);
        let list = ChoiceList::attach(&frame, &["Ok"]).unwrap();
        assert_eq!(display.live_handles(), 4);
        drop(list);
        assert_eq!(display.live_handles(), 3);
    }
}
