mod choice;
mod display;
mod frame;

pub use choice::{ChoiceLayout, ChoiceList, DEFAULT_MARK};
pub use display::{Display, PanelId, WindowId};
pub use frame::{MIN_COLUMNS, MIN_LINES, OverlayFrame, center_above};
