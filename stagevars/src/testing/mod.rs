//! Testing utilities for stagevars tasks.
//!
//! This module provides:
//! - A stage context builder
//! - Mock tasks
//! - Assertions over task results

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_output_contains, assert_outputs_eq, assert_succeeded};
pub use fixtures::TestStageContext;
pub use mocks::{FailingTask, RecordingTask, StaticTask};
