//! Mock tasks for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::context::StageExecutionContext;
use crate::core::{ExecutionStatus, TaskResult};
use crate::errors::{InputShapeError, StagevarsError};
use crate::tasks::Task;

/// A task that returns fixed outputs and status, echoing the context.
#[derive(Debug)]
pub struct StaticTask {
    kind: String,
    status: ExecutionStatus,
    outputs: HashMap<String, serde_json::Value>,
}

impl StaticTask {
    /// Creates a task that succeeds with no outputs.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            status: ExecutionStatus::Succeeded,
            outputs: HashMap::new(),
        }
    }

    /// Sets the status to report.
    #[must_use]
    pub fn with_status(mut self, status: ExecutionStatus) -> Self {
        self.status = status;
        self
    }

    /// Adds an output entry.
    #[must_use]
    pub fn with_output(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.outputs.insert(key.into(), value);
        self
    }
}

#[async_trait]
impl Task for StaticTask {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn execute(&self, stage: &StageExecutionContext) -> Result<TaskResult, StagevarsError> {
        Ok(TaskResult::builder(self.status)
            .context(stage.to_map())
            .outputs(self.outputs.clone())
            .build())
    }
}

/// A task that always fails with an input-shape error.
#[derive(Debug)]
pub struct FailingTask {
    kind: String,
    field: String,
}

impl FailingTask {
    /// Creates a task that fails on the given field.
    #[must_use]
    pub fn new(kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            field: field.into(),
        }
    }
}

#[async_trait]
impl Task for FailingTask {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn execute(&self, _stage: &StageExecutionContext) -> Result<TaskResult, StagevarsError> {
        Err(InputShapeError::new(self.field.clone(), "rejected by test task").into())
    }
}

/// A task that records every snapshot it is given.
#[derive(Debug)]
pub struct RecordingTask {
    kind: String,
    seen: Mutex<Vec<StageExecutionContext>>,
}

impl RecordingTask {
    /// Creates a new recording task.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of times the task was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.seen.lock().len()
    }

    /// Returns the snapshots from each call.
    #[must_use]
    pub fn recorded_contexts(&self) -> Vec<StageExecutionContext> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl Task for RecordingTask {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn execute(&self, stage: &StageExecutionContext) -> Result<TaskResult, StagevarsError> {
        self.seen.lock().push(stage.clone());
        Ok(TaskResult::builder(ExecutionStatus::Succeeded)
            .context(stage.to_map())
            .build())
    }
}
