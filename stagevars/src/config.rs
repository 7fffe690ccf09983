//! Engine configuration.

use crate::engine::MergePolicy;
use crate::errors::StagevarsError;
use crate::observability::{LogFormat, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`EngineConfig::merge_policy`].
pub const MERGE_POLICY_ENV: &str = "STAGEVARS_MERGE_POLICY";

/// Environment variable overriding [`LoggingConfig::format`].
pub const LOG_FORMAT_ENV: &str = "STAGEVARS_LOG_FORMAT";

/// Configuration for the engine boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How task result contexts are applied to stored stage contexts.
    #[serde(default)]
    pub merge_policy: MergePolicy,
    /// Logging setup.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the merge policy.
    #[must_use]
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, StagevarsError> {
        serde_json::from_str(json).map_err(|e| StagevarsError::Config(e.to_string()))
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StagevarsError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, StagevarsError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, StagevarsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(policy) = lookup(MERGE_POLICY_ENV) {
            self.merge_policy = policy.parse()?;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            self.logging.format = format.parse::<LogFormat>()?;
        }
        Ok(self)
    }
}
