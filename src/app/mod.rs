mod dialogs;
mod edit_value;
pub(crate) mod input;
mod modal;
mod options;
mod screen;
mod select_type;
mod terminal;

pub use dialogs::Dialogs;
pub use edit_value::EditOutcome;
pub use input::{KeyInput, classify};
pub use modal::{DIALOG_CANCEL, DIALOG_OK, DIALOG_RESIZE, NoticeKind};
pub use options::DialogOptions;
pub use screen::{HeadlessScreen, Screen};
pub use terminal::TerminalScreen;
