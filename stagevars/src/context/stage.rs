//! Read-only stage execution context handed to tasks.

use crate::errors::InputShapeError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A snapshot of a stage's accumulated execution state.
///
/// The engine owns the live context; tasks only ever see an owned snapshot
/// through a shared reference and have no way to mutate it.
///
/// Outputs inherited from ancestor stages sit in a separate layer that is
/// consulted only by lookups. They are never serialized and never appear in
/// [`as_map`](Self::as_map) or [`to_map`](Self::to_map).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageExecutionContext {
    data: HashMap<String, serde_json::Value>,
    #[serde(skip)]
    inherited: HashMap<String, serde_json::Value>,
}

impl StageExecutionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context from existing data.
    #[must_use]
    pub fn from_data(data: HashMap<String, serde_json::Value>) -> Self {
        Self {
            data,
            inherited: HashMap::new(),
        }
    }

    /// Sets the fallback layer of outputs inherited from ancestor stages.
    #[must_use]
    pub fn with_inherited(mut self, inherited: HashMap<String, serde_json::Value>) -> Self {
        self.inherited = inherited;
        self
    }

    /// Creates a context from a JSON value, which must be an object.
    pub fn from_value(value: serde_json::Value) -> Result<Self, InputShapeError> {
        match value {
            serde_json::Value::Object(map) => Ok(Self::from_data(map.into_iter().collect())),
            other => Err(InputShapeError::new(
                "<root>",
                format!("expected an object, found {}", json_kind(&other)),
            )),
        }
    }

    /// Adds an entry, for building contexts by hand.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Gets a value from the stage's own data, falling back to inherited outputs.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key).or_else(|| self.inherited.get(key))
    }

    /// Checks if a key is visible through [`get`](Self::get).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key) || self.inherited.contains_key(key)
    }

    /// Borrows the inherited output layer.
    #[must_use]
    pub fn inherited(&self) -> &HashMap<String, serde_json::Value> {
        &self.inherited
    }

    /// Returns the keys of the stage's own data.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    /// Returns the number of own entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the stage has no own entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrows the stage's own data.
    #[must_use]
    pub fn as_map(&self) -> &HashMap<String, serde_json::Value> {
        &self.data
    }

    /// Re-serializes the stage's own data into an independently owned map.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, serde_json::Value> {
        self.data.clone()
    }
}

impl From<HashMap<String, serde_json::Value>> for StageExecutionContext {
    fn from(data: HashMap<String, serde_json::Value>) -> Self {
        Self::from_data(data)
    }
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
