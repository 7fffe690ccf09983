//! The engine boundary tasks plug into.
//!
//! This module provides:
//! - Merge policies for applying task results to stored stage context
//! - Thread-safe per-stage pipeline state with ancestor output visibility
//! - A runner that executes a stage's tasks and merges their results

mod merge;
mod runner;
mod state;

pub use merge::{context_delta, merge_outputs, MergePolicy};
pub use runner::{StagePlan, StageRunner};
pub use state::{PipelineState, StageRecord};
