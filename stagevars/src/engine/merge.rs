//! How task results are folded back into stored stage state.

use crate::errors::StagevarsError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How the engine applies a result's context to the stored stage context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The result context is the full stage context and replaces it.
    #[default]
    FullEcho,
    /// Only entries that differ from the snapshot given to the task are
    /// written; everything else is retained.
    Delta,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullEcho => write!(f, "full_echo"),
            Self::Delta => write!(f, "delta"),
        }
    }
}

impl FromStr for MergePolicy {
    type Err = StagevarsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full_echo" | "full-echo" => Ok(Self::FullEcho),
            "delta" => Ok(Self::Delta),
            other => Err(StagevarsError::Config(format!(
                "unknown merge policy '{other}', expected 'full_echo' or 'delta'"
            ))),
        }
    }
}

/// Entries of `after` that are new or changed relative to `before`.
#[must_use]
pub fn context_delta(
    before: &HashMap<String, serde_json::Value>,
    after: &HashMap<String, serde_json::Value>,
) -> HashMap<String, serde_json::Value> {
    after
        .iter()
        .filter(|(key, value)| before.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl MergePolicy {
    /// Applies a result context to the stored stage context.
    ///
    /// `snapshot` is the context the task was given. Returns the entries
    /// that were actually written.
    pub fn merge_context(
        self,
        stored: &mut HashMap<String, serde_json::Value>,
        snapshot: &HashMap<String, serde_json::Value>,
        result_context: HashMap<String, serde_json::Value>,
    ) -> HashMap<String, serde_json::Value> {
        match self {
            Self::FullEcho => {
                let written = context_delta(stored, &result_context);
                *stored = result_context;
                written
            }
            Self::Delta => {
                let written = context_delta(snapshot, &result_context);
                stored.extend(written.clone());
                written
            }
        }
    }
}

/// Merges outputs with replace semantics: later writers win per key.
pub fn merge_outputs(
    stored: &mut HashMap<String, serde_json::Value>,
    outputs: HashMap<String, serde_json::Value>,
) {
    stored.extend(outputs);
}
