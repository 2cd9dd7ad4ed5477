use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Terminal,
    backend::TestBackend,
    buffer::Buffer,
    layout::{Position, Rect},
};

use crate::{
    error::{DialogError, DialogResult},
    presentation::Display,
};

/// The terminal a dialog runs against.
pub trait Screen {
    /// Full extent of the screen.
    fn area(&self) -> Rect;

    /// Blocks until one key press is available.
    fn read_key(&mut self) -> DialogResult<KeyEvent>;

    /// Redraws the whole panel stack in one pass.
    fn update(&mut self, display: &Display) -> DialogResult<()>;
}

impl<S: Screen + ?Sized> Screen for &mut S {
    fn area(&self) -> Rect {
        (**self).area()
    }

    fn read_key(&mut self) -> DialogResult<KeyEvent> {
        (**self).read_key()
    }

    fn update(&mut self, display: &Display) -> DialogResult<()> {
        (**self).update(display)
    }
}

/// An in-memory screen fed from a scripted key queue.
///
/// Running out of keys ends the dialog with [`DialogError::InputClosed`].
pub struct HeadlessScreen {
    terminal: Terminal<TestBackend>,
    keys: VecDeque<KeyEvent>,
    recording: bool,
    history: Vec<Buffer>,
    cursor: Option<Position>,
}

impl HeadlessScreen {
    pub fn new(width: u16, height: u16) -> DialogResult<Self> {
        let terminal = Terminal::new(TestBackend::new(width, height))?;
        Ok(Self {
            terminal,
            keys: VecDeque::new(),
            recording: false,
            history: Vec::new(),
            cursor: None,
        })
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Keeps a copy of every composed frame.
    pub fn with_recording(mut self) -> Self {
        self.recording = true;
        self
    }

    pub fn push_key(&mut self, code: KeyCode) {
        self.keys.push_back(KeyEvent::new(code, KeyModifiers::NONE));
    }

    pub fn push_event(&mut self, key: KeyEvent) {
        self.keys.push_back(key);
    }

    /// Queues one key press per character.
    pub fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.push_key(KeyCode::Char(ch));
        }
    }

    pub fn pending_keys(&self) -> usize {
        self.keys.len()
    }

    /// The last composed frame as text, one string per row.
    pub fn contents(&self) -> Vec<String> {
        buffer_lines(self.terminal.backend().buffer())
    }

    pub fn history(&self) -> &[Buffer] {
        &self.history
    }

    pub fn cursor(&self) -> Option<Position> {
        self.cursor
    }
}

impl Screen for HeadlessScreen {
    fn area(&self) -> Rect {
        let buffer = self.terminal.backend().buffer();
        buffer.area
    }

    fn read_key(&mut self) -> DialogResult<KeyEvent> {
        self.keys.pop_front().ok_or(DialogError::InputClosed)
    }

    fn update(&mut self, display: &Display) -> DialogResult<()> {
        self.terminal.draw(|frame| {
            display.compose(frame.buffer_mut());
            if let Some(cursor) = display.cursor() {
                frame.set_cursor_position(cursor);
            }
        })?;
        self.cursor = display.cursor();
        if self.recording {
            self.history.push(self.terminal.backend().buffer().clone());
        }
        Ok(())
    }
}

fn buffer_lines(buffer: &Buffer) -> Vec<String> {
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| {
                    buffer
                        .cell(Position::new(x, y))
                        .map(|cell| cell.symbol())
                        .unwrap_or(" ")
                })
                .collect()
        })
        .collect()
}
