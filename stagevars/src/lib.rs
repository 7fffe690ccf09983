//! # Stagevars
//!
//! Stage context propagation for a pipeline execution engine.
//!
//! A stage accumulates a context as it runs. Upstream expression evaluation
//! leaves a list of already evaluated variables in that context; the
//! `evaluateVariables` task republishes them as outputs so that later stages
//! can read them. This crate provides:
//!
//! - **Context projection**: fallible parsing of an opaque stage context into
//!   a typed view, and re-serialization back into map form
//! - **Output projection task**: filtering inert variables and folding the
//!   rest into outputs, last write winning
//! - **Engine boundary**: an explicit task registry, configurable merge
//!   policies and thread-safe pipeline state with ancestor output visibility
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stagevars::prelude::*;
//! use std::sync::Arc;
//!
//! let runner = StageRunner::new(
//!     Arc::new(TaskRegistry::with_builtin_tasks()),
//!     Arc::new(PipelineState::new()),
//!     EngineConfig::new().with_env_overrides()?,
//! );
//!
//! let plan = StagePlan::new("vars")
//!     .with_task(EvaluateVariablesTask::KIND)
//!     .with_context("variables", serde_json::json!([{"key": "image", "value": "app:1.2"}]));
//!
//! runner.run_stage(&plan).await?;
//! let outputs = runner.state().outputs("vars");
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod core;
pub mod engine;
pub mod errors;
pub mod observability;
pub mod tasks;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::context::{
        parse_stage_context, serialize_context, EvaluateVariablesContext, StageExecutionContext,
        Variable, VariableSet, VARIABLES_FIELD,
    };
    pub use crate::core::{ExecutionStatus, TaskResult, TaskResultBuilder};
    pub use crate::engine::{MergePolicy, PipelineState, StagePlan, StageRecord, StageRunner};
    pub use crate::errors::{ContractErrorInfo, InputShapeError, StagevarsError};
    pub use crate::observability::{init_tracing, LogFormat, LoggingConfig};
    pub use crate::tasks::{EvaluateVariablesTask, FnTask, Task, TaskRegistry};
}
