use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Top-level key carrying an item's stable identity across renames.
pub const IDENTITY_KEY: &str = "uuid";

/// A single configuration item: an ordered mapping of keys to values.
///
/// Items are never compared structurally by the engine; they are encoded to
/// canonical text first (see [`Encoder`](crate::Encoder)).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigItem(Mapping);

impl ConfigItem {
    /// Create an empty item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, preserving insertion order.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a top-level key.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(Value::String(key.to_string()), value.into())
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The item's rename identity, if it carries one.
    pub fn identity(&self) -> Option<&str> {
        self.get(IDENTITY_KEY).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The underlying mapping.
    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }
}

impl From<Mapping> for ConfigItem {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}
