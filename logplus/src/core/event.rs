//! The in-flight event record processors operate on.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A structured log event flowing through the processor chain.
///
/// The logger identity and level are carried opaquely; processors only
/// interpret the field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDict {
    /// The identity of the logger that emitted the event.
    pub logger: String,

    /// The level or method name the event was emitted at.
    pub level: String,

    /// The event payload fields.
    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
}

impl EventDict {
    /// Creates a new event for `logger` at `level`.
    #[must_use]
    pub fn new(logger: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            logger: logger.into(),
            level: level.into(),
            fields: HashMap::new(),
        }
    }

    /// Adds a field to the event.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Inserts `value` under `key` only if the key is absent.
    pub fn set_default(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.fields.entry(key.into()).or_insert(value);
    }

    /// Gets a field value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }

    /// Checks whether a field is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Converts to a dictionary representation including logger and level.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = self.fields.clone();
        map.insert("logger".to_string(), serde_json::json!(self.logger));
        map.insert("level".to_string(), serde_json::json!(self.level));
        map
    }
}
