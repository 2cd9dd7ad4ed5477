use std::{
    io::{self, Stdout},
    sync::Once,
};

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};

use super::screen::Screen;
use crate::{error::DialogResult, presentation::Display};

static PANIC_HOOK: Once = Once::new();

/// The real terminal in raw mode on the alternate screen. Dropping it
/// restores the terminal, as does a panic while it is alive.
pub struct TerminalScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    area: Rect,
}

impl TerminalScreen {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        install_panic_hook();
        terminal.clear().context("failed to clear terminal")?;
        let size = terminal.size().context("failed to query terminal size")?;
        Ok(Self {
            terminal,
            area: Rect::new(0, 0, size.width, size.height),
        })
    }
}

impl Screen for TerminalScreen {
    fn area(&self) -> Rect {
        self.area
    }

    fn read_key(&mut self) -> DialogResult<KeyEvent> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(key),
                Event::Resize(width, height) => {
                    self.area = Rect::new(0, 0, width, height);
                }
                _ => {}
            }
        }
    }

    fn update(&mut self, display: &Display) -> DialogResult<()> {
        self.terminal.draw(|frame| {
            display.compose(frame.buffer_mut());
            if let Some(cursor) = display.cursor() {
                frame.set_cursor_position(cursor);
            }
        })?;
        Ok(())
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        restore_terminal();
    }
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            previous(panic_info);
        }));
    });
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen, Show);
}
