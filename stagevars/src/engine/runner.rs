//! Runs a stage's tasks and merges their results into pipeline state.

use super::PipelineState;
use crate::config::EngineConfig;
use crate::core::ExecutionStatus;
use crate::errors::StagevarsError;
use crate::observability::SpanTimer;
use crate::tasks::{Task, TaskRegistry};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// What to run for one stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagePlan {
    /// Stage id within the pipeline.
    pub stage_id: String,
    /// Task kinds to run, in order.
    pub tasks: Vec<String>,
    /// Upstream stages whose outputs this stage sees, in merge order.
    #[serde(default)]
    pub ancestors: Vec<String>,
    /// Initial stage context.
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
}

impl StagePlan {
    /// Creates a plan with no tasks.
    #[must_use]
    pub fn new(stage_id: impl Into<String>) -> Self {
        Self {
            stage_id: stage_id.into(),
            ..Self::default()
        }
    }

    /// Appends a task kind.
    #[must_use]
    pub fn with_task(mut self, kind: impl Into<String>) -> Self {
        self.tasks.push(kind.into());
        self
    }

    /// Appends an ancestor stage.
    #[must_use]
    pub fn with_ancestor(mut self, stage_id: impl Into<String>) -> Self {
        self.ancestors.push(stage_id.into());
        self
    }

    /// Sets a context entry.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }
}

/// Executes stage plans against a shared [`PipelineState`].
///
/// Ordering between stages is the caller's responsibility: ancestors named in
/// a plan must have finished before the plan runs.
#[derive(Debug, Clone)]
pub struct StageRunner {
    registry: Arc<TaskRegistry>,
    state: Arc<PipelineState>,
    config: EngineConfig,
}

impl StageRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new(registry: Arc<TaskRegistry>, state: Arc<PipelineState>, config: EngineConfig) -> Self {
        Self {
            registry,
            state,
            config,
        }
    }

    /// Returns the shared pipeline state.
    #[must_use]
    pub fn state(&self) -> &Arc<PipelineState> {
        &self.state
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs every task of a stage in order.
    ///
    /// All task kinds are resolved before anything executes. A task error
    /// marks the stage `TERMINAL` and is returned unchanged. The next task
    /// runs only if the previous status [continues the
    /// stage](ExecutionStatus::continues_stage). A `FAILED_CONTINUE` task lets
    /// the remaining tasks run but the stage finishes as `FAILED_CONTINUE`.
    pub async fn run_stage(&self, plan: &StagePlan) -> Result<ExecutionStatus, StagevarsError> {
        let stage_id = plan.stage_id.as_str();
        self.state.register_stage(stage_id, plan.context.clone());

        let tasks = match self.resolve(&plan.tasks) {
            Ok(tasks) => tasks,
            Err(err) => {
                self.state
                    .mark_failed(stage_id, ExecutionStatus::Terminal, err.to_string())?;
                self.state.finish(stage_id, 0.0)?;
                tracing::error!(stage_id, error = %err, "Stage tasks could not be resolved");
                return Err(err);
            }
        };

        self.state.mark_running(stage_id)?;
        let timer = SpanTimer::start(stage_id);
        let mut status = ExecutionStatus::Succeeded;
        let mut degraded = false;

        for task in tasks {
            let snapshot = self.state.snapshot_for(stage_id, &plan.ancestors)?;

            let result = match task.execute(&snapshot).await {
                Ok(result) => result,
                Err(err) => {
                    self.state
                        .mark_failed(stage_id, ExecutionStatus::Terminal, err.to_string())?;
                    self.state.finish(stage_id, timer.elapsed_ms())?;
                    tracing::error!(
                        stage_id,
                        task_kind = task.kind(),
                        error = %err,
                        "Task failed"
                    );
                    return Err(err);
                }
            };

            status = self.state.apply_result(
                stage_id,
                task.kind(),
                &snapshot,
                result,
                self.config.merge_policy,
            )?;

            if !status.continues_stage() {
                tracing::warn!(
                    stage_id,
                    task_kind = task.kind(),
                    %status,
                    "Stopping stage after task status"
                );
                break;
            }
            if status.is_failure() {
                degraded = true;
            }
        }

        if degraded && status.is_success() {
            status = ExecutionStatus::FailedContinue;
            self.state.set_status(stage_id, status)?;
        }

        let duration_ms = timer.finish();
        self.state.finish(stage_id, duration_ms)?;
        tracing::info!(stage_id, %status, duration_ms, "Stage finished");

        Ok(status)
    }

    /// Runs independent stages concurrently.
    ///
    /// Results are returned in plan order.
    pub async fn run_concurrently(
        &self,
        plans: &[StagePlan],
    ) -> Vec<Result<ExecutionStatus, StagevarsError>> {
        join_all(plans.iter().map(|plan| self.run_stage(plan))).await
    }

    fn resolve(&self, kinds: &[String]) -> Result<Vec<Arc<dyn Task>>, StagevarsError> {
        kinds.iter().map(|kind| self.registry.create(kind)).collect()
    }
}
