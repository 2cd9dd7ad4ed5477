use thiserror::Error;

use crate::domain::StoreError;
use crate::form::CodecError;

pub type DialogResult<T> = std::result::Result<T, DialogError>;

/// Failures surfaced by the dialog engine.
///
/// Validation failures are deliberately absent: a field that does not match
/// its pattern only blocks the focus transition.
#[derive(Debug, Error)]
pub enum DialogError {
    #[error("could not allocate {0}")]
    Allocation(&'static str),

    #[error("value {0:?} already exists")]
    NameConflict(String),

    #[error("value storage rejected the change: {0}")]
    Storage(#[from] StoreError),

    #[error("value data could not be converted: {0}")]
    Codec(#[from] CodecError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("input stream closed before the dialog finished")]
    InputClosed,
}
