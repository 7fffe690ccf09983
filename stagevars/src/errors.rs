//! Error types for stagevars.
//!
//! Tasks in this crate only ever fail by propagating an input-shape error
//! from context projection. The remaining kinds belong to the engine side:
//! registry lookups, pipeline state, and configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Error code attached to input-shape errors.
pub const INPUT_SHAPE_CODE: &str = "CONTEXT-001-SHAPE";

/// The main error type for stagevars operations.
#[derive(Debug, Error)]
pub enum StagevarsError {
    /// The stage context could not be projected into a task's typed view.
    #[error("{0}")]
    InputShape(#[from] InputShapeError),

    /// No task is registered under the requested kind.
    #[error("Unknown task kind: {kind}")]
    UnknownTask {
        /// The requested task kind.
        kind: String,
    },

    /// The pipeline state has no record for the requested stage.
    #[error("Unknown stage: {stage}")]
    UnknownStage {
        /// The requested stage id.
        stage: String,
    },

    /// Invalid engine configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StagevarsError {
    /// Creates an unknown task error.
    #[must_use]
    pub fn unknown_task(kind: impl Into<String>) -> Self {
        Self::UnknownTask { kind: kind.into() }
    }

    /// Creates an unknown stage error.
    #[must_use]
    pub fn unknown_stage(stage: impl Into<String>) -> Self {
        Self::UnknownStage {
            stage: stage.into(),
        }
    }

    /// Whether the engine may retry the failed operation.
    ///
    /// Nothing raised here is transient: a malformed context stays malformed
    /// and a missing registration stays missing.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = match self {
            Self::InputShape(err) => err.to_dict(),
            Self::UnknownTask { kind } => {
                let mut map = HashMap::new();
                map.insert("type".to_string(), serde_json::json!("UnknownTask"));
                map.insert("kind".to_string(), serde_json::json!(kind));
                map
            }
            Self::UnknownStage { stage } => {
                let mut map = HashMap::new();
                map.insert("type".to_string(), serde_json::json!("UnknownStage"));
                map.insert("stage".to_string(), serde_json::json!(stage));
                map
            }
            Self::Config(_) => {
                HashMap::from([("type".to_string(), serde_json::json!("Config"))])
            }
            Self::Serialization(_) => {
                HashMap::from([("type".to_string(), serde_json::json!("Serialization"))])
            }
            Self::Io(_) => HashMap::from([("type".to_string(), serde_json::json!("Io"))]),
        };
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

impl From<serde_json::Error> for StagevarsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Metadata about a contract error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "CONTEXT-001-SHAPE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::Value::String(self.code.clone()));
        map.insert("summary".to_string(), serde_json::Value::String(self.summary.clone()));

        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::Value::String(hint.clone()));
        }
        if !self.context.is_empty() {
            let context_map: serde_json::Map<String, serde_json::Value> = self
                .context
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            map.insert("context".to_string(), serde_json::Value::Object(context_map));
        }

        map
    }
}

/// Error raised when a stage context cannot be projected into the typed
/// view a task expects.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid stage context field '{field}': {message}")]
pub struct InputShapeError {
    /// The offending context field.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
    /// Contract error info.
    pub error_info: ContractErrorInfo,
}

impl InputShapeError {
    /// Creates a new input-shape error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        let message = message.into();
        let info = ContractErrorInfo::new(
            INPUT_SHAPE_CODE,
            format!("Stage context field '{field}' has an unexpected shape"),
        )
        .with_fix_hint("Check the stage configuration that produced this field.")
        .with_context_entry("field", field.clone());

        Self {
            field,
            message,
            error_info: info,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("InputShape"));
        map.insert("field".to_string(), serde_json::json!(self.field));
        let info_map: serde_json::Map<String, serde_json::Value> =
            self.error_info.to_dict().into_iter().collect();
        map.insert("error_info".to_string(), serde_json::Value::Object(info_map));
        map
    }
}
