#![deny(rust_2018_idioms)]

//! Modal dialogs for editing typed registry values in a terminal.
//!
//! [`Dialogs`] is the entry point: it owns a [`Screen`] and a [`Display`]
//! stack and offers notices, text prompts, a value-type picker and the
//! compound value editor.

mod app;
mod domain;
mod error;
pub mod form;
pub mod presentation;

pub use app::{
    DIALOG_CANCEL, DIALOG_OK, DIALOG_RESIZE, DialogOptions, Dialogs, EditOutcome, HeadlessScreen,
    KeyInput, NoticeKind, Screen, TerminalScreen, classify,
};
pub use domain::{MemoryKey, StoreError, TypedValue, ValueItem, ValueKind, ValueStore};
pub use error::{DialogError, DialogResult};
pub use presentation::Display;

pub mod prelude {
    pub use super::{
        DialogError, DialogOptions, Dialogs, EditOutcome, HeadlessScreen, MemoryKey, NoticeKind,
        Screen, TypedValue, ValueKind, ValueStore,
    };
}
