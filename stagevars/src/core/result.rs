//! Task result type returned to the engine after each task execution.

use super::ExecutionStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The result of one task execution.
///
/// `TaskResult` is immutable once built: fields are only readable, and the
/// engine takes ownership of the parts exactly once through
/// [`TaskResult::into_parts`] when merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    status: ExecutionStatus,

    #[serde(default)]
    context: HashMap<String, serde_json::Value>,

    #[serde(default)]
    outputs: HashMap<String, serde_json::Value>,
}

impl TaskResult {
    /// Starts building a result with the given status.
    #[must_use]
    pub fn builder(status: ExecutionStatus) -> TaskResultBuilder {
        TaskResultBuilder {
            status,
            context: HashMap::new(),
            outputs: HashMap::new(),
        }
    }

    /// A bare `SUCCEEDED` result with no context and no outputs.
    #[must_use]
    pub fn succeeded() -> Self {
        Self::builder(ExecutionStatus::Succeeded).build()
    }

    /// Returns the status.
    #[must_use]
    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    /// Returns the context to be merged into the stage.
    #[must_use]
    pub fn context(&self) -> &HashMap<String, serde_json::Value> {
        &self.context
    }

    /// Returns the outputs to be merged into the stage and visible downstream.
    #[must_use]
    pub fn outputs(&self) -> &HashMap<String, serde_json::Value> {
        &self.outputs
    }

    /// Gets a single output value.
    #[must_use]
    pub fn output(&self, key: &str) -> Option<&serde_json::Value> {
        self.outputs.get(key)
    }

    /// Consumes the result, yielding `(status, context, outputs)`.
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        ExecutionStatus,
        HashMap<String, serde_json::Value>,
        HashMap<String, serde_json::Value>,
    ) {
        (self.status, self.context, self.outputs)
    }
}

/// Builder for [`TaskResult`].
#[derive(Debug, Clone)]
pub struct TaskResultBuilder {
    status: ExecutionStatus,
    context: HashMap<String, serde_json::Value>,
    outputs: HashMap<String, serde_json::Value>,
}

impl TaskResultBuilder {
    /// Sets the context, replacing anything set before.
    #[must_use]
    pub fn context(mut self, context: HashMap<String, serde_json::Value>) -> Self {
        self.context = context;
        self
    }

    /// Sets the outputs, replacing anything set before.
    #[must_use]
    pub fn outputs(mut self, outputs: HashMap<String, serde_json::Value>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Adds a single output entry.
    #[must_use]
    pub fn output(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.outputs.insert(key.into(), value);
        self
    }

    /// Builds the result.
    #[must_use]
    pub fn build(self) -> TaskResult {
        TaskResult {
            status: self.status,
            context: self.context,
            outputs: self.outputs,
        }
    }
}
