use std::fmt;

use serde::{Deserialize, Serialize};

/// Registry value types the editor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    #[serde(rename = "REG_DWORD")]
    Dword,
    #[serde(rename = "REG_SZ")]
    String,
    #[serde(rename = "REG_EXPAND_SZ")]
    ExpandString,
    #[serde(rename = "REG_MULTI_SZ")]
    MultiString,
    #[serde(rename = "REG_BINARY")]
    Binary,
}

impl ValueKind {
    /// Picker order.
    pub const ALL: [ValueKind; 5] = [
        ValueKind::Dword,
        ValueKind::String,
        ValueKind::ExpandString,
        ValueKind::MultiString,
        ValueKind::Binary,
    ];

    /// Numeric registry type code.
    pub fn code(self) -> i32 {
        match self {
            ValueKind::String => 1,
            ValueKind::ExpandString => 2,
            ValueKind::Binary => 3,
            ValueKind::Dword => 4,
            ValueKind::MultiString => 7,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        ValueKind::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Dword => "REG_DWORD",
            ValueKind::String => "REG_SZ",
            ValueKind::ExpandString => "REG_EXPAND_SZ",
            ValueKind::MultiString => "REG_MULTI_SZ",
            ValueKind::Binary => "REG_BINARY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ValueKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn is_binary(self) -> bool {
        matches!(self, ValueKind::Binary)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value kind together with its raw stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedValue {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    pub data: Vec<u8>,
}

impl TypedValue {
    pub fn new(kind: ValueKind, data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }
}

/// A named value read from a key, handed to the editor for modification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueItem {
    pub name: String,
    #[serde(flatten)]
    pub value: TypedValue,
}

impl ValueItem {
    pub fn new(name: impl Into<String>, value: TypedValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind
    }
}
