//! Stage contexts and the variables they carry.
//!
//! This module provides:
//! - The read-only stage execution context handed to tasks
//! - The variable data model and its publishing rules
//! - Fallible projection of a context into a typed task view

#[cfg(test)]
mod context_tests;
mod projection;
mod stage;
mod variables;

pub use projection::{parse_stage_context, serialize_context, EvaluateVariablesContext};
pub use stage::StageExecutionContext;
pub use variables::{Variable, VariableSet, VARIABLES_FIELD};
