//! Task trait and built-in tasks.
//!
//! Tasks are the smallest unit of work inside a stage. The engine hands each
//! task a read-only snapshot of the stage context and merges the returned
//! [`TaskResult`] back into shared state.

mod evaluate_variables;
mod registry;

pub use evaluate_variables::EvaluateVariablesTask;
pub use registry::{TaskFactory, TaskRegistry};

use crate::context::StageExecutionContext;
use crate::core::TaskResult;
use crate::errors::StagevarsError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for pipeline tasks.
#[async_trait]
pub trait Task: Send + Sync + Debug {
    /// Returns the task kind this instance was registered under.
    fn kind(&self) -> &str;

    /// Executes the task against a stage context snapshot.
    ///
    /// # Arguments
    ///
    /// * `stage` - The stage execution context
    ///
    /// # Returns
    ///
    /// The task result, or the error that prevented one from being built.
    async fn execute(&self, stage: &StageExecutionContext) -> Result<TaskResult, StagevarsError>;
}

/// A simple function-based task.
pub struct FnTask<F>
where
    F: Fn(&StageExecutionContext) -> Result<TaskResult, StagevarsError> + Send + Sync,
{
    kind: String,
    func: F,
}

impl<F> FnTask<F>
where
    F: Fn(&StageExecutionContext) -> Result<TaskResult, StagevarsError> + Send + Sync,
{
    /// Creates a new function-based task.
    pub fn new(kind: impl Into<String>, func: F) -> Self {
        Self {
            kind: kind.into(),
            func,
        }
    }
}

impl<F> Debug for FnTask<F>
where
    F: Fn(&StageExecutionContext) -> Result<TaskResult, StagevarsError> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTask").field("kind", &self.kind).finish()
    }
}

#[async_trait]
impl<F> Task for FnTask<F>
where
    F: Fn(&StageExecutionContext) -> Result<TaskResult, StagevarsError> + Send + Sync,
{
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn execute(&self, stage: &StageExecutionContext) -> Result<TaskResult, StagevarsError> {
        (self.func)(stage)
    }
}
