//! Execution status of tasks and stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The execution status reported by a task and recorded on a stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Not yet scheduled.
    #[default]
    NotStarted,
    /// Currently executing.
    Running,
    /// Paused by an operator.
    Paused,
    /// Waiting on an external condition.
    Suspended,
    /// Completed successfully.
    Succeeded,
    /// Failed, but the pipeline may continue.
    #[serde(alias = "FAILED")]
    FailedContinue,
    /// Failed and halted the pipeline.
    Terminal,
    /// Cancelled before completion.
    Canceled,
    /// Asks the engine to jump elsewhere in the graph.
    Redirect,
    /// Stopped early without being a failure.
    Stopped,
    /// Queued behind another execution.
    Buffered,
    /// Skipped by the engine.
    Skipped,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Suspended => "SUSPENDED",
            Self::Succeeded => "SUCCEEDED",
            Self::FailedContinue => "FAILED_CONTINUE",
            Self::Terminal => "TERMINAL",
            Self::Canceled => "CANCELED",
            Self::Redirect => "REDIRECT",
            Self::Stopped => "STOPPED",
            Self::Buffered => "BUFFERED",
            Self::Skipped => "SKIPPED",
        };
        f.write_str(name)
    }
}

impl ExecutionStatus {
    /// Returns true if no further work will happen for this execution.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            Self::Succeeded
                | Self::FailedContinue
                | Self::Skipped
                | Self::Terminal
                | Self::Canceled
                | Self::Stopped
        )
    }

    /// Returns true if the status halts the remaining tasks of the stage.
    #[must_use]
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Terminal | Self::Canceled | Self::Stopped)
    }

    /// Returns true if the next task of the stage may run after this status.
    ///
    /// The task must have completed without halting; `FAILED_CONTINUE`
    /// qualifies, while in-flight statuses such as `RUNNING` do not.
    #[must_use]
    pub fn continues_stage(&self) -> bool {
        self.is_complete() && !self.is_halt()
    }

    /// Returns true if the status indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Skipped)
    }

    /// Returns true if the status indicates failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FailedContinue | Self::Terminal)
    }
}
