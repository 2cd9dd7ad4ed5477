use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    widgets::{Clear, Widget},
};

use crate::{
    app::input::KeyInput,
    error::DialogResult,
    presentation::{Display, OverlayFrame, WindowId},
};

const OFFSET_WIDTH: usize = 8;
const HEX_START: usize = OFFSET_WIDTH + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexCommand {
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    Input(char),
}

impl HexCommand {
    pub fn from_key(key: KeyInput) -> Option<Self> {
        match key {
            KeyInput::Up => Some(HexCommand::CursorUp),
            KeyInput::Down => Some(HexCommand::CursorDown),
            KeyInput::Left => Some(HexCommand::CursorLeft),
            KeyInput::Right => Some(HexCommand::CursorRight),
            KeyInput::Char(ch) => Some(HexCommand::Input(ch)),
            _ => None,
        }
    }
}

/// Hex dump editor over a growable byte buffer.
///
/// Each row shows an offset, `bytes_per_row` hex cells and their printable
/// ASCII. Hex digits overwrite the nibble under the cursor; after the low
/// nibble the cursor advances to the next byte.
#[derive(Debug)]
pub struct HexEditor {
    display: Display,
    window: Option<WindowId>,
    data: Vec<u8>,
    cursor: usize,
    low_nibble: bool,
    bytes_per_row: usize,
    top_row: usize,
}

impl HexEditor {
    pub fn new(
        frame: &OverlayFrame,
        rows: u16,
        bytes_per_row: usize,
        y: u16,
        x: u16,
        initial: &[u8],
    ) -> DialogResult<Self> {
        let bytes_per_row = bytes_per_row.max(1);
        let width = u16::try_from(HEX_START + bytes_per_row * 4 + 1).unwrap_or(u16::MAX);
        let content_width = frame
            .content_area()
            .map(|area| area.width.saturating_sub(x))
            .unwrap_or(width);
        let window = frame.derive(rows, width.min(content_width), y, x)?;
        Ok(Self {
            display: frame.display().clone(),
            window: Some(window),
            data: initial.to_vec(),
            cursor: 0,
            low_nibble: false,
            bytes_per_row,
            top_row: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn current_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn cursor_offset(&self) -> usize {
        self.cursor
    }

    pub fn drive(&mut self, command: HexCommand) {
        let last = self.data.len().saturating_sub(1);
        match command {
            HexCommand::CursorUp => {
                if self.cursor >= self.bytes_per_row {
                    self.cursor -= self.bytes_per_row;
                }
                self.low_nibble = false;
            }
            HexCommand::CursorDown => {
                if self.cursor + self.bytes_per_row <= last {
                    self.cursor += self.bytes_per_row;
                }
                self.low_nibble = false;
            }
            HexCommand::CursorLeft => {
                self.cursor = self.cursor.saturating_sub(1);
                self.low_nibble = false;
            }
            HexCommand::CursorRight => {
                if self.cursor < last {
                    self.cursor += 1;
                }
                self.low_nibble = false;
            }
            HexCommand::Input(ch) => {
                let Some(nibble) = ch.to_digit(16) else {
                    return;
                };
                let Some(byte) = self.data.get_mut(self.cursor) else {
                    return;
                };
                let nibble = nibble as u8;
                if self.low_nibble {
                    *byte = (*byte & 0xf0) | nibble;
                    self.low_nibble = false;
                    if self.cursor < last {
                        self.cursor += 1;
                    }
                } else {
                    *byte = (*byte & 0x0f) | (nibble << 4);
                    self.low_nibble = true;
                }
            }
        }
        self.scroll_to_cursor();
        self.refresh();
    }

    /// Grows with zeros or truncates to `len` bytes.
    pub fn resize(&mut self, len: usize) {
        self.data.resize(len, 0);
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
            self.low_nibble = false;
        }
        self.scroll_to_cursor();
    }

    /// Moves the terminal cursor onto the nibble being edited.
    pub fn set_cursor(&self) {
        let Some(area) = self.area() else {
            return;
        };
        let row = (self.cursor / self.bytes_per_row).saturating_sub(self.top_row);
        let column =
            HEX_START + (self.cursor % self.bytes_per_row) * 3 + usize::from(self.low_nibble);
        if let (Ok(x), Ok(y)) = (u16::try_from(column), u16::try_from(row))
            && x < area.width
            && y < area.height
        {
            self.display
                .set_cursor(Some(Position::new(area.x + x, area.y + y)));
        }
    }

    pub fn refresh(&self) {
        let Some(window) = self.window else {
            return;
        };
        self.display.paint(window, |area, buf| {
            Clear.render(area, buf);
            let width = usize::from(area.width);
            for line in 0..area.height {
                let row = self.top_row + usize::from(line);
                let start = row * self.bytes_per_row;
                if start >= self.data.len() && !(start == 0 && self.data.is_empty()) {
                    break;
                }
                let end = (start + self.bytes_per_row).min(self.data.len());
                let chunk = &self.data[start.min(end)..end];
                let text = self.format_row(start, chunk);
                buf.set_stringn(area.x, area.y + line, text, width, Style::default());
                if (start..end).contains(&self.cursor) {
                    let column = HEX_START + (self.cursor - start) * 3;
                    if column + 2 <= width {
                        let cell = Rect::new(area.x + column as u16, area.y + line, 2, 1);
                        buf.set_style(cell, Style::default().add_modifier(Modifier::REVERSED));
                    }
                }
            }
        });
    }

    fn format_row(&self, offset: usize, chunk: &[u8]) -> String {
        let mut hex = chunk
            .iter()
            .map(|byte| format!("{byte:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        let pad = self.bytes_per_row * 3 - 1;
        while hex.len() < pad {
            hex.push(' ');
        }
        let ascii: String = chunk
            .iter()
            .map(|byte| {
                if byte.is_ascii_graphic() || *byte == b' ' {
                    char::from(*byte)
                } else {
                    '.'
                }
            })
            .collect();
        format!("{offset:0width$X}  {hex}  {ascii}", width = OFFSET_WIDTH)
    }

    fn area(&self) -> Option<Rect> {
        self.window.and_then(|window| self.display.window_area(window))
    }

    fn scroll_to_cursor(&mut self) {
        let rows = self
            .area()
            .map(|area| usize::from(area.height.max(1)))
            .unwrap_or(1);
        let row = self.cursor / self.bytes_per_row;
        if row < self.top_row {
            self.top_row = row;
        } else if row >= self.top_row + rows {
            self.top_row = row + 1 - rows;
        }
    }
}

impl Drop for HexEditor {
    fn drop(&mut self) {
        if let Some(window) = self.window.take() {
            self.display.release_window(window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_editor(initial: &[u8], check: impl FnOnce(&mut HexEditor)) {
        let display = Display::new(Rect::new(0, 0, 80, 24));
        let frame = OverlayFrame::create(&display, "hex", 19, 50, 0, 0).unwrap();
        let mut editor = HexEditor::new(&frame, 4, 8, 4, 0, initial).unwrap();
        check(&mut editor);
    }

    #[test]
    fn hex_digits_fill_high_then_low_nibble() {
        with_editor(&[0, 0, 0], |editor| {
            editor.drive(HexCommand::Input('a'));
            editor.drive(HexCommand::Input('5'));
            editor.drive(HexCommand::Input('F'));
            assert_eq!(editor.current_bytes(), &[0xa5, 0xf0, 0]);
            assert_eq!(editor.cursor_offset(), 1);
        });
    }

    #[test]
    fn non_hex_input_is_ignored() {
        with_editor(&[0x12], |editor| {
            editor.drive(HexCommand::Input('z'));
            assert_eq!(editor.current_bytes(), &[0x12]);
        });
    }

    #[test]
    fn cursor_moves_by_byte_and_row() {
        let data: Vec<u8> = (0..20).collect();
        with_editor(&data, |editor| {
            editor.drive(HexCommand::CursorDown);
            editor.drive(HexCommand::CursorDown);
            assert_eq!(editor.cursor_offset(), 16);
            editor.drive(HexCommand::CursorDown);
            assert_eq!(editor.cursor_offset(), 16, "no row below");
            editor.drive(HexCommand::CursorRight);
            editor.drive(HexCommand::CursorUp);
            assert_eq!(editor.cursor_offset(), 9);
            editor.drive(HexCommand::CursorLeft);
            assert_eq!(editor.cursor_offset(), 8);
        });
    }

    #[test]
    fn resize_pads_and_truncates() {
        with_editor(&[1, 2, 3, 4], |editor| {
            editor.resize(6);
            assert_eq!(editor.current_bytes(), &[1, 2, 3, 4, 0, 0]);
            for _ in 0..5 {
                editor.drive(HexCommand::CursorRight);
            }
            editor.resize(2);
            assert_eq!(editor.current_bytes(), &[1, 2]);
            assert_eq!(editor.cursor_offset(), 1);
        });
    }

    #[test]
    fn empty_buffer_accepts_no_input() {
        with_editor(&[], |editor| {
            editor.drive(HexCommand::Input('1'));
            editor.drive(HexCommand::CursorRight);
            assert!(editor.is_empty());
            assert_eq!(editor.cursor_offset(), 0);
            editor.refresh();
            editor.set_cursor();
        });
    }

    #[test]
    fn rows_format_offset_hex_and_ascii() {
        with_editor(&[0x41, 0x00], |editor| {
            let row = editor.format_row(0, &[0x41, 0x00]);
            assert!(row.starts_with("00000000  41 00"));
            assert!(row.ends_with("A."));
        });
    }
}
