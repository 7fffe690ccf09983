//! Publishes previously evaluated variables as stage outputs.

use super::Task;
use crate::context::{parse_stage_context, StageExecutionContext};
use crate::core::{ExecutionStatus, TaskResult};
use crate::errors::StagevarsError;
use async_trait::async_trait;

/// Copies evaluated variables into the outputs map for later stages.
///
/// Variables arrive already evaluated; this task only filters out inert
/// entries and folds the rest into outputs, last write winning. The whole
/// stage context is echoed back unchanged as the result context.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluateVariablesTask;

impl EvaluateVariablesTask {
    /// Registry kind of this task.
    pub const KIND: &'static str = "evaluateVariables";

    /// Creates the task.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Task for EvaluateVariablesTask {
    fn kind(&self) -> &str {
        Self::KIND
    }

    async fn execute(&self, stage: &StageExecutionContext) -> Result<TaskResult, StagevarsError> {
        let context = parse_stage_context(stage)?;
        let outputs = context.variables.to_outputs();

        tracing::debug!(
            task = Self::KIND,
            variables = context.variables.len(),
            published = outputs.len(),
            inert = context.variables.inert_positions().len(),
            shadowed = ?context.variables.shadowed_keys(),
            "Projected variables into outputs"
        );

        Ok(TaskResult::builder(ExecutionStatus::Succeeded)
            .context(stage.to_map())
            .outputs(outputs)
            .build())
    }
}
