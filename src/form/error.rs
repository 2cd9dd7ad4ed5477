use thiserror::Error;

use crate::domain::ValueKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("{kind}: {message}")]
    Malformed { kind: ValueKind, message: String },

    #[error("{kind}: data widget does not hold {expected}")]
    Mismatch {
        kind: ValueKind,
        expected: &'static str,
    },
}

impl CodecError {
    pub fn malformed(kind: ValueKind, message: impl Into<String>) -> Self {
        Self::Malformed {
            kind,
            message: message.into(),
        }
    }
}
