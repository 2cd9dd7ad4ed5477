use ratatui::{
    layout::{Position, Rect},
    style::Style,
    widgets::{Block, Clear, Widget},
};
use tracing::warn;

use crate::error::{DialogError, DialogResult};

use super::display::{Display, PanelId, WindowId};

/// Smallest frame that still has a one-cell content region.
pub const MIN_LINES: u16 = 3;
pub const MIN_COLUMNS: u16 = 3;

/// A bordered overlay window with an inset content region, stacked above
/// whatever was drawn before it.
#[derive(Debug)]
pub struct OverlayFrame {
    display: Display,
    outer: Rect,
    window: Option<WindowId>,
    content: Option<WindowId>,
    panel: Option<PanelId>,
}

impl OverlayFrame {
    pub fn create(
        display: &Display,
        title: &str,
        lines: u16,
        columns: u16,
        y: u16,
        x: u16,
    ) -> DialogResult<Self> {
        let outer = Rect::new(x, y, columns.max(MIN_COLUMNS), lines.max(MIN_LINES));
        let mut frame = Self {
            display: display.clone(),
            outer,
            window: None,
            content: None,
            panel: None,
        };

        let window = display.new_window(outer)?;
        frame.window = Some(window);
        display.paint(window, |area, buf| {
            Clear.render(area, buf);
            Block::bordered().title(title.to_string()).render(area, buf);
        });

        frame.content = Some(display.derive_window(
            window,
            outer.height - 2,
            outer.width - 2,
            1,
            1,
        )?);
        frame.panel = Some(display.new_panel(window)?);
        Ok(frame)
    }

    /// Creates a frame sized to fit `below` and placed toward its centre.
    pub fn create_centered(
        display: &Display,
        title: &str,
        lines: u16,
        columns: u16,
        below: Rect,
    ) -> DialogResult<Self> {
        let area = center_above(below, lines, columns);
        Self::create(display, title, area.height, area.width, area.y, area.x).inspect_err(|err| {
            warn!(title, %err, "overlay frame could not be created");
        })
    }

    pub fn outer_area(&self) -> Rect {
        self.outer
    }

    pub fn content_area(&self) -> Option<Rect> {
        self.content
            .and_then(|content| self.display.window_area(content))
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Derives a window inside the content region.
    pub fn derive(&self, lines: u16, columns: u16, y: u16, x: u16) -> DialogResult<WindowId> {
        let content = self
            .content
            .ok_or(DialogError::Allocation("content region"))?;
        self.display.derive_window(content, lines, columns, y, x)
    }

    /// Writes `text` at a content-relative position, clipped to the region.
    pub fn write(&self, y: u16, x: u16, text: &str) {
        let Some(content) = self.content else {
            return;
        };
        self.display.paint(content, |area, buf| {
            if y >= area.height || x >= area.width {
                return;
            }
            let width = usize::from(area.width - x);
            buf.set_stringn(area.x + x, area.y + y, text, width, Style::default());
        });
    }

    /// Moves the terminal cursor to a content-relative position.
    pub fn park_cursor(&self, y: u16, x: u16) {
        if let Some(area) = self.content_area() {
            self.display
                .set_cursor(Some(Position::new(area.x + x, area.y + y)));
        }
    }

    /// Releases the content region, outer window and stack slot. Handles
    /// that were never created are skipped, so calling this more than once
    /// or on a half-built frame is harmless.
    pub fn destroy(&mut self) {
        if let Some(content) = self.content.take() {
            self.display.release_window(content);
        }
        if let Some(window) = self.window.take() {
            self.display.release_window(window);
        }
        if let Some(panel) = self.panel.take() {
            self.display.release_panel(panel);
        }
    }
}

impl Drop for OverlayFrame {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Geometry for a frame stacked above `below`.
///
/// The size is clamped to `below`. In each dimension where the frame is
/// smaller than half of `below`, it is placed so that it ends at the
/// midpoint; otherwise it starts at `below`'s origin.
pub fn center_above(below: Rect, lines: u16, columns: u16) -> Rect {
    let lines = lines.min(below.height);
    let columns = columns.min(below.width);
    let center_y = below.height / 2;
    let center_x = below.width / 2;

    let y = if lines < center_y { center_y - lines } else { 0 };
    let x = if columns < center_x {
        center_x - columns
    } else {
        0
    };
    Rect::new(below.x + x, below.y + y, columns, lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display() -> Display {
        Display::new(Rect::new(0, 0, 80, 24))
    }

    #[test]
    fn centered_geometry_never_leaves_reference() {
        let below = Rect::new(0, 0, 80, 24);
        for lines in [0, 1, 5, 11, 12, 13, 24, 40, u16::MAX] {
            for columns in [0, 1, 20, 39, 40, 41, 80, 200] {
                let area = center_above(below, lines, columns);
                assert!(area.height <= below.height && area.width <= below.width);
                assert!(area.bottom() <= below.bottom(), "{lines}x{columns} -> {area:?}");
                assert!(area.right() <= below.right(), "{lines}x{columns} -> {area:?}");
            }
        }
    }

    #[test]
    fn small_frames_end_at_the_midpoint() {
        let area = center_above(Rect::new(0, 0, 80, 24), 5, 20);
        assert_eq!(area, Rect::new(20, 7, 20, 5));
        let big = center_above(Rect::new(0, 0, 80, 24), 19, 50);
        assert_eq!((big.x, big.y), (0, 0));
    }

    #[test]
    fn centering_respects_reference_origin() {
        let area = center_above(Rect::new(10, 4, 40, 20), 4, 10);
        assert_eq!(area, Rect::new(20, 10, 10, 4));
    }

    #[test]
    fn content_is_inset_by_border() {
        let display = display();
        let frame = OverlayFrame::create(&display, "Title", 6, 12, 2, 3).unwrap();
        assert_eq!(frame.outer_area(), Rect::new(3, 2, 12, 6));
        assert_eq!(frame.content_area(), Some(Rect::new(4, 3, 10, 4)));
        assert_eq!(display.panel_count(), 1);
    }

    #[test]
    fn tiny_requests_are_grown_to_minimum() {
        let display = display();
        let frame = OverlayFrame::create(&display, "", 0, 1, 0, 0).unwrap();
        assert_eq!(frame.outer_area().height, MIN_LINES);
        assert_eq!(frame.content_area().map(|area| area.width), Some(1));
    }

    #[test]
    fn partial_construction_releases_everything() {
        let display = display().with_handle_limit(2);
        let err = OverlayFrame::create(&display, "x", 5, 20, 0, 0).unwrap_err();
        assert!(matches!(err, DialogError::Allocation("panel")));
        assert_eq!(display.live_handles(), 0);
    }

    #[test]
    fn destroy_is_idempotent() {
        let display = display();
        let mut frame = OverlayFrame::create(&display, "x", 5, 20, 0, 0).unwrap();
        frame.destroy();
        frame.destroy();
        assert_eq!(display.live_handles(), 0);
        assert_eq!(frame.content_area(), None);
        drop(frame);
        assert_eq!(display.live_handles(), 0);
    }
}
