//! Retained windows and a z-ordered panel stack on top of ratatui buffers.
//!
//! Root windows own a canvas; derived windows are views into their root's
//! canvas. Only windows registered as panels take part in [`Display::compose`].

use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
};
use tracing::{trace, warn};

use crate::error::{DialogError, DialogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelId(u32);

#[derive(Debug)]
struct WindowSlot {
    area: Rect,
    root: Option<WindowId>,
    canvas: Option<Buffer>,
}

#[derive(Debug)]
struct DisplayState {
    area: Rect,
    windows: IndexMap<WindowId, WindowSlot>,
    panels: Vec<(PanelId, WindowId)>,
    next_id: u32,
    handle_limit: Option<usize>,
    cursor: Option<Position>,
}

impl DisplayState {
    fn live_handles(&self) -> usize {
        self.windows.len() + self.panels.len()
    }

    fn reserve(&mut self, what: &'static str) -> DialogResult<u32> {
        if let Some(limit) = self.handle_limit
            && self.live_handles() >= limit
        {
            warn!(what, limit, "display handle limit reached");
            return Err(DialogError::Allocation(what));
        }
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }
}

/// Shared handle to the display stack. Cloning is cheap and every clone sees
/// the same windows.
#[derive(Debug, Clone)]
pub struct Display {
    state: Rc<RefCell<DisplayState>>,
}

impl Display {
    pub fn new(area: Rect) -> Self {
        Self {
            state: Rc::new(RefCell::new(DisplayState {
                area,
                windows: IndexMap::new(),
                panels: Vec::new(),
                next_id: 1,
                handle_limit: None,
                cursor: None,
            })),
        }
    }

    /// Caps the number of simultaneously live windows and panels.
    pub fn with_handle_limit(self, limit: usize) -> Self {
        self.state.borrow_mut().handle_limit = Some(limit);
        self
    }

    pub fn area(&self) -> Rect {
        self.state.borrow().area
    }

    pub fn resize(&self, area: Rect) {
        self.state.borrow_mut().area = area;
    }

    /// Windows and panels that have not been released yet.
    pub fn live_handles(&self) -> usize {
        self.state.borrow().live_handles()
    }

    pub fn panel_count(&self) -> usize {
        self.state.borrow().panels.len()
    }

    pub fn new_window(&self, area: Rect) -> DialogResult<WindowId> {
        let mut state = self.state.borrow_mut();
        if area.is_empty() || state.area.intersection(area) != area {
            warn!(?area, screen = ?state.area, "window does not fit the screen");
            return Err(DialogError::Allocation("window"));
        }
        let id = WindowId(state.reserve("window")?);
        state.windows.insert(
            id,
            WindowSlot {
                area,
                root: None,
                canvas: Some(Buffer::empty(area)),
            },
        );
        trace!(?id, ?area, "window created");
        Ok(id)
    }

    /// Creates a window inside `parent`, positioned relative to its origin.
    pub fn derive_window(
        &self,
        parent: WindowId,
        lines: u16,
        columns: u16,
        y: u16,
        x: u16,
    ) -> DialogResult<WindowId> {
        let mut state = self.state.borrow_mut();
        let Some(slot) = state.windows.get(&parent) else {
            return Err(DialogError::Allocation("sub-window"));
        };
        let parent_area = slot.area;
        let root = slot.root.unwrap_or(parent);
        let area = Rect::new(
            parent_area.x.saturating_add(x),
            parent_area.y.saturating_add(y),
            columns,
            lines,
        );
        if area.is_empty() || parent_area.intersection(area) != area {
            warn!(?area, ?parent_area, "sub-window does not fit its parent");
            return Err(DialogError::Allocation("sub-window"));
        }
        let id = WindowId(state.reserve("sub-window")?);
        state.windows.insert(
            id,
            WindowSlot {
                area,
                root: Some(root),
                canvas: None,
            },
        );
        trace!(?id, ?parent, ?area, "sub-window created");
        Ok(id)
    }

    pub fn window_area(&self, window: WindowId) -> Option<Rect> {
        self.state.borrow().windows.get(&window).map(|slot| slot.area)
    }

    pub fn release_window(&self, window: WindowId) {
        if self.state.borrow_mut().windows.shift_remove(&window).is_some() {
            trace!(?window, "window released");
        }
    }

    /// Puts `window` on top of the stack.
    pub fn new_panel(&self, window: WindowId) -> DialogResult<PanelId> {
        let mut state = self.state.borrow_mut();
        match state.windows.get(&window) {
            Some(slot) if slot.root.is_none() => {}
            _ => return Err(DialogError::Allocation("panel")),
        }
        let id = PanelId(state.reserve("panel")?);
        state.panels.push((id, window));
        Ok(id)
    }

    pub fn release_panel(&self, panel: PanelId) {
        self.state
            .borrow_mut()
            .panels
            .retain(|(id, _)| *id != panel);
    }

    /// Draws into `window`. The closure receives the window's absolute area
    /// and the backing canvas; drawing outside the area is the caller's bug.
    /// Released windows are ignored.
    pub fn paint(&self, window: WindowId, draw: impl FnOnce(Rect, &mut Buffer)) {
        let mut state = self.state.borrow_mut();
        let Some(slot) = state.windows.get(&window) else {
            return;
        };
        let area = slot.area;
        let root = slot.root.unwrap_or(window);
        if let Some(canvas) = state
            .windows
            .get_mut(&root)
            .and_then(|slot| slot.canvas.as_mut())
        {
            draw(area, canvas);
        }
    }

    pub fn set_cursor(&self, cursor: Option<Position>) {
        self.state.borrow_mut().cursor = cursor;
    }

    pub fn cursor(&self) -> Option<Position> {
        self.state.borrow().cursor
    }

    /// Copies every panel, bottom to top, onto `target`.
    pub fn compose(&self, target: &mut Buffer) {
        let state = self.state.borrow();
        for (_, window) in &state.panels {
            let Some(canvas) = state
                .windows
                .get(window)
                .and_then(|slot| slot.canvas.as_ref())
            else {
                continue;
            };
            let overlap = canvas.area.intersection(target.area);
            for y in overlap.top()..overlap.bottom() {
                for x in overlap.left()..overlap.right() {
                    let position = Position::new(x, y);
                    if let (Some(source), Some(cell)) =
                        (canvas.cell(position), target.cell_mut(position))
                    {
                        *cell = source.clone();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{style::Style, widgets::Widget, widgets::Clear};

    fn screen() -> Display {
        Display::new(Rect::new(0, 0, 40, 12))
    }

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (buffer.area.left()..buffer.area.right())
            .map(|x| buffer.cell(Position::new(x, y)).map(|c| c.symbol()).unwrap_or(" "))
            .collect()
    }

    #[test]
    fn windows_must_fit_the_screen() {
        let display = screen();
        assert!(display.new_window(Rect::new(30, 0, 20, 4)).is_err());
        assert!(display.new_window(Rect::new(0, 0, 0, 4)).is_err());
        assert_eq!(display.live_handles(), 0);
    }

    #[test]
    fn derived_windows_stay_inside_parent() {
        let display = screen();
        let root = display.new_window(Rect::new(2, 2, 10, 5)).unwrap();
        let child = display.derive_window(root, 3, 8, 1, 1).unwrap();
        assert_eq!(display.window_area(child), Some(Rect::new(3, 3, 8, 3)));
        assert!(display.derive_window(root, 3, 8, 3, 3).is_err());
    }

    #[test]
    fn handle_limit_blocks_allocation() {
        let display = screen().with_handle_limit(2);
        let root = display.new_window(Rect::new(0, 0, 5, 5)).unwrap();
        display.new_panel(root).unwrap();
        assert!(matches!(
            display.derive_window(root, 1, 1, 0, 0),
            Err(DialogError::Allocation("sub-window"))
        ));
    }

    #[test]
    fn compose_stacks_panels_in_order() {
        let display = screen();
        let low = display.new_window(Rect::new(0, 0, 6, 1)).unwrap();
        let high = display.new_window(Rect::new(3, 0, 3, 1)).unwrap();
        display.paint(low, |area, buf| {
            buf.set_string(area.x, area.y, "aaaaaa", Style::default());
        });
        display.paint(high, |area, buf| {
            Clear.render(area, buf);
            buf.set_string(area.x, area.y, "bbb", Style::default());
        });
        display.new_panel(low).unwrap();
        let top = display.new_panel(high).unwrap();

        let mut target = Buffer::empty(Rect::new(0, 0, 8, 1));
        display.compose(&mut target);
        assert_eq!(row_text(&target, 0), "aaabbb  ");

        display.release_panel(top);
        let mut target = Buffer::empty(Rect::new(0, 0, 8, 1));
        display.compose(&mut target);
        assert_eq!(row_text(&target, 0), "aaaaaa  ");
    }

    #[test]
    fn painting_a_released_window_is_ignored() {
        let display = screen();
        let root = display.new_window(Rect::new(0, 0, 4, 1)).unwrap();
        let child = display.derive_window(root, 1, 2, 0, 0).unwrap();
        display.release_window(root);
        let mut called = false;
        display.paint(child, |_, _| called = true);
        assert!(!called, "orphaned sub-window has no canvas");
        display.release_window(child);
        display.release_window(child);
        assert_eq!(display.live_handles(), 0);
    }
}
