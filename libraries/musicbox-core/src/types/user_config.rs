//! Persisted per-user preferences

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque per-user preference bag
///
/// Loaded when a session is created and saved when it is destroyed. The
/// session core never interprets the keys; callers own their meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserConfig {
    values: Map<String, Value>,
}

impl UserConfig {
    /// Read a value, returning `None` if missing or of another shape
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Store a value under `key`, replacing any previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) {
        // Serializing plain data into a `Value` cannot fail
        if let Ok(value) = serde_json::to_value(value) {
            self.values.insert(key.into(), value);
        }
    }

    /// Remove a value, returning whether it existed
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}
