use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::value::{TypedValue, ValueItem};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("value {0:?} not found")]
    NotFound(String),

    #[error("access denied writing {0:?}")]
    AccessDenied(String),

    #[error("{0}")]
    Backend(String),
}

/// The key a value editor reads from and commits into.
pub trait ValueStore {
    fn get_value(&self, name: &str) -> Result<TypedValue, StoreError>;

    fn set_value(&mut self, name: &str, value: TypedValue) -> Result<(), StoreError>;

    fn value_exists(&self, name: &str) -> bool {
        self.get_value(name).is_ok()
    }
}

/// An in-memory key that keeps values in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryKey {
    #[serde(default)]
    path: String,
    #[serde(default)]
    values: IndexMap<String, TypedValue>,
    #[serde(skip)]
    read_only: bool,
}

impl MemoryKey {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Rejects every write with [`StoreError::AccessDenied`].
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn item(&self, name: &str) -> Option<ValueItem> {
        self.values
            .get(name)
            .map(|value| ValueItem::new(name, value.clone()))
    }

    pub fn items(&self) -> impl Iterator<Item = ValueItem> + '_ {
        self.values
            .iter()
            .map(|(name, value)| ValueItem::new(name.clone(), value.clone()))
    }

    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn to_json_string(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl ValueStore for MemoryKey {
    fn get_value(&self, name: &str) -> Result<TypedValue, StoreError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn set_value(&mut self, name: &str, value: TypedValue) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::AccessDenied(name.to_string()));
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValueKind;

    #[test]
    fn missing_values_report_not_found() {
        let key = MemoryKey::new("HKLM\\Software");
        assert_eq!(
            key.get_value("absent"),
            Err(StoreError::NotFound("absent".to_string()))
        );
        assert!(!key.value_exists("absent"));
    }

    #[test]
    fn read_only_key_rejects_writes() {
        let mut key = MemoryKey::new("HKLM").read_only(true);
        let err = key
            .set_value("x", TypedValue::new(ValueKind::Binary, vec![1]))
            .unwrap_err();
        assert!(matches!(err, StoreError::AccessDenied(name) if name == "x"));
        assert!(key.is_empty());
    }

    #[test]
    fn json_round_trip_keeps_order() {
        let key = MemoryKey::new("HKCU\\Test")
            .with_value("b", TypedValue::new(ValueKind::Dword, vec![2, 0, 0, 0]))
            .with_value("a", TypedValue::new(ValueKind::Binary, vec![0xff]));
        let raw = key.to_json_string(false).unwrap();
        let parsed = MemoryKey::from_json_str(&raw).unwrap();
        let names: Vec<_> = parsed.items().map(|item| item.name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(parsed.path(), "HKCU\\Test");
    }
}
