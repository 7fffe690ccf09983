//! Core domain model types for stagevars.
//!
//! This module contains the types every task and the engine agree on:
//! - Execution status with completion and halt semantics
//! - The immutable task result and its builder

mod result;
#[cfg(test)]
mod result_tests;
mod status;

pub use result::{TaskResult, TaskResultBuilder};
pub use status::ExecutionStatus;
