//! Shared per-stage execution state.

use super::merge::{merge_outputs, MergePolicy};
use crate::context::StageExecutionContext;
use crate::core::{ExecutionStatus, TaskResult};
use crate::errors::StagevarsError;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Everything the engine knows about one stage execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage id within the pipeline.
    pub stage_id: String,
    /// Unique id of this execution attempt.
    pub execution_id: Uuid,
    /// Current status.
    pub status: ExecutionStatus,
    /// Stored stage context.
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
    /// Outputs visible to downstream stages.
    #[serde(default)]
    pub outputs: HashMap<String, serde_json::Value>,
    /// Kinds of the tasks whose results were merged, in order.
    #[serde(default)]
    pub completed_tasks: Vec<String>,
    /// Error message if the stage failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the stage started running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the stage stopped running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Wall time spent running tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

impl StageRecord {
    fn new(stage_id: String, context: HashMap<String, serde_json::Value>) -> Self {
        Self {
            stage_id,
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::NotStarted,
            context,
            outputs: HashMap::new(),
            completed_tasks: Vec::new(),
            error: None,
            started_at: None,
            ended_at: None,
            duration_ms: None,
        }
    }
}

/// Thread-safe store of stage records for one pipeline execution.
///
/// Reads hand out owned copies and every merge happens under a single write
/// lock, so stages running concurrently never observe a half-applied result.
#[derive(Debug, Default)]
pub struct PipelineState {
    stages: RwLock<HashMap<String, StageRecord>>,
}

impl PipelineState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a stage with its initial context, replacing any earlier record.
    ///
    /// Returns the execution id of the new record.
    pub fn register_stage(
        &self,
        stage_id: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Uuid {
        let stage_id = stage_id.into();
        let record = StageRecord::new(stage_id.clone(), context);
        let execution_id = record.execution_id;
        self.stages.write().insert(stage_id, record);
        execution_id
    }

    /// Builds the context snapshot a task of `stage_id` runs against.
    ///
    /// Outputs of `ancestors` are folded in the given order, later ancestors
    /// winning, into the snapshot's inherited layer. The stage's own context
    /// shadows them on lookup and is the only data a task can echo back.
    pub fn snapshot_for(
        &self,
        stage_id: &str,
        ancestors: &[String],
    ) -> Result<StageExecutionContext, StagevarsError> {
        let stages = self.stages.read();
        let mut inherited = HashMap::new();

        for ancestor in ancestors {
            let record = stages
                .get(ancestor)
                .ok_or_else(|| StagevarsError::unknown_stage(ancestor.as_str()))?;
            merge_outputs(&mut inherited, record.outputs.clone());
        }

        let own = stages
            .get(stage_id)
            .ok_or_else(|| StagevarsError::unknown_stage(stage_id))?;

        Ok(StageExecutionContext::from_data(own.context.clone()).with_inherited(inherited))
    }

    /// Merges a task result into the stage record.
    ///
    /// Returns the status the stage now carries.
    pub fn apply_result(
        &self,
        stage_id: &str,
        task_kind: &str,
        snapshot: &StageExecutionContext,
        result: TaskResult,
        policy: MergePolicy,
    ) -> Result<ExecutionStatus, StagevarsError> {
        let mut stages = self.stages.write();
        let record = stages
            .get_mut(stage_id)
            .ok_or_else(|| StagevarsError::unknown_stage(stage_id))?;

        let (status, context, outputs) = result.into_parts();
        let written = policy.merge_context(&mut record.context, snapshot.as_map(), context);
        let published = outputs.len();
        merge_outputs(&mut record.outputs, outputs);
        record.status = status;
        record.completed_tasks.push(task_kind.to_string());

        tracing::debug!(
            stage_id,
            task_kind,
            %status,
            %policy,
            context_written = written.len(),
            outputs_published = published,
            "Merged task result"
        );

        Ok(status)
    }

    /// Marks a stage as running.
    pub fn mark_running(&self, stage_id: &str) -> Result<(), StagevarsError> {
        self.update(stage_id, |record| {
            record.status = ExecutionStatus::Running;
            record.started_at = Some(Utc::now());
        })
    }

    /// Marks a stage as failed with the given status and message.
    pub fn mark_failed(
        &self,
        stage_id: &str,
        status: ExecutionStatus,
        error: impl Into<String>,
    ) -> Result<(), StagevarsError> {
        let error = error.into();
        self.update(stage_id, move |record| {
            record.status = status;
            record.error = Some(error);
        })
    }

    /// Overrides the status a stage carries.
    pub fn set_status(&self, stage_id: &str, status: ExecutionStatus) -> Result<(), StagevarsError> {
        self.update(stage_id, |record| record.status = status)
    }

    /// Records the end of a stage run.
    pub fn finish(&self, stage_id: &str, duration_ms: f64) -> Result<(), StagevarsError> {
        self.update(stage_id, |record| {
            record.ended_at = Some(Utc::now());
            record.duration_ms = Some(duration_ms);
        })
    }

    /// Returns a copy of a stage record.
    #[must_use]
    pub fn record(&self, stage_id: &str) -> Option<StageRecord> {
        self.stages.read().get(stage_id).cloned()
    }

    /// Returns a copy of a stage's outputs.
    #[must_use]
    pub fn outputs(&self, stage_id: &str) -> Option<HashMap<String, serde_json::Value>> {
        self.stages.read().get(stage_id).map(|r| r.outputs.clone())
    }

    /// Returns a copy of a stage's stored context.
    #[must_use]
    pub fn context(&self, stage_id: &str) -> Option<HashMap<String, serde_json::Value>> {
        self.stages.read().get(stage_id).map(|r| r.context.clone())
    }

    /// Returns a stage's status.
    #[must_use]
    pub fn status(&self, stage_id: &str) -> Option<ExecutionStatus> {
        self.stages.read().get(stage_id).map(|r| r.status)
    }

    /// Returns all registered stage ids, sorted.
    #[must_use]
    pub fn stage_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.stages.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn update<F>(&self, stage_id: &str, apply: F) -> Result<(), StagevarsError>
    where
        F: FnOnce(&mut StageRecord),
    {
        let mut stages = self.stages.write();
        let record = stages
            .get_mut(stage_id)
            .ok_or_else(|| StagevarsError::unknown_stage(stage_id))?;
        apply(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(value: serde_json::Value) -> HashMap<String, serde_json::Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_register_stage() {
        let state = PipelineState::new();
        let first = state.register_stage("s1", map(serde_json::json!({"a": 1})));
        let second = state.register_stage("s1", HashMap::new());

        assert_ne!(first, second);
        let record = state.record("s1").unwrap();
        assert_eq!(record.execution_id, second);
        assert_eq!(record.status, ExecutionStatus::NotStarted);
        assert!(record.context.is_empty());
    }

    #[test]
    fn test_snapshot_folds_ancestor_outputs_in_order() {
        let state = PipelineState::new();
        state.register_stage("a", HashMap::new());
        state.register_stage("b", HashMap::new());
        state.register_stage("c", map(serde_json::json!({"shared": "own"})));

        let a_out = TaskResult::builder(ExecutionStatus::Succeeded)
            .output("x", serde_json::json!("from a"))
            .output("shared", serde_json::json!("from a"))
            .build();
        let b_out = TaskResult::builder(ExecutionStatus::Succeeded)
            .output("x", serde_json::json!("from b"))
            .build();
        let empty = StageExecutionContext::new();
        state.apply_result("a", "t", &empty, a_out, MergePolicy::Delta).unwrap();
        state.apply_result("b", "t", &empty, b_out, MergePolicy::Delta).unwrap();

        let snapshot = state
            .snapshot_for("c", &["a".to_string(), "b".to_string()])
            .unwrap();

        assert_eq!(snapshot.get("x"), Some(&serde_json::json!("from b")));
        assert_eq!(snapshot.get("shared"), Some(&serde_json::json!("own")));
        assert_eq!(snapshot.to_map(), map(serde_json::json!({"shared": "own"})));
        assert_eq!(
            snapshot.inherited(),
            &map(serde_json::json!({"x": "from b", "shared": "from a"}))
        );
    }

    #[test]
    fn test_snapshot_unknown_ancestor() {
        let state = PipelineState::new();
        state.register_stage("c", HashMap::new());

        let err = state.snapshot_for("c", &["ghost".to_string()]).unwrap_err();
        assert!(matches!(err, StagevarsError::UnknownStage { ref stage } if stage == "ghost"));
    }

    #[test]
    fn test_apply_result_records_task() {
        let state = PipelineState::new();
        state.register_stage("s1", map(serde_json::json!({"a": 1})));
        let snapshot = state.snapshot_for("s1", &[]).unwrap();

        let result = TaskResult::builder(ExecutionStatus::Succeeded)
            .context(snapshot.to_map())
            .output("o", serde_json::json!(true))
            .build();
        let status = state
            .apply_result("s1", "evaluateVariables", &snapshot, result, MergePolicy::FullEcho)
            .unwrap();

        assert_eq!(status, ExecutionStatus::Succeeded);
        let record = state.record("s1").unwrap();
        assert_eq!(record.completed_tasks, vec!["evaluateVariables".to_string()]);
        assert_eq!(record.context, map(serde_json::json!({"a": 1})));
        assert_eq!(record.outputs, map(serde_json::json!({"o": true})));
    }

    #[test]
    fn test_lifecycle_marks() {
        let state = PipelineState::new();
        state.register_stage("s1", HashMap::new());

        state.mark_running("s1").unwrap();
        assert_eq!(state.status("s1"), Some(ExecutionStatus::Running));

        state.set_status("s1", ExecutionStatus::FailedContinue).unwrap();
        assert_eq!(state.status("s1"), Some(ExecutionStatus::FailedContinue));

        state.mark_failed("s1", ExecutionStatus::Terminal, "boom").unwrap();
        state.finish("s1", 1.5).unwrap();

        let record = state.record("s1").unwrap();
        assert_eq!(record.status, ExecutionStatus::Terminal);
        assert_eq!(record.error.as_deref(), Some("boom"));
        assert!(record.started_at.is_some());
        assert!(record.ended_at.is_some());
        assert_eq!(record.duration_ms, Some(1.5));
    }

    #[test]
    fn test_unknown_stage_updates_fail() {
        let state = PipelineState::new();
        assert!(state.mark_running("nope").is_err());
        assert!(state.set_status("nope", ExecutionStatus::Succeeded).is_err());
        assert!(state.record("nope").is_none());
        assert!(state.stage_ids().is_empty());
    }
}
