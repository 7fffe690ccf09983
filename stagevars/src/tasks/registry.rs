//! Registry mapping task kinds to constructors.

use super::{EvaluateVariablesTask, Task};
use crate::errors::StagevarsError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Factory function type for creating tasks.
pub type TaskFactory = Box<dyn Fn() -> Arc<dyn Task> + Send + Sync>;

/// Explicit registry of the tasks an engine can run.
///
/// Every task the engine can resolve is registered here by kind; nothing is
/// discovered implicitly.
#[derive(Default)]
pub struct TaskRegistry {
    factories: RwLock<HashMap<String, TaskFactory>>,
}

impl TaskRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the tasks shipped in this crate.
    #[must_use]
    pub fn with_builtin_tasks() -> Self {
        let registry = Self::new();
        registry.register(
            EvaluateVariablesTask::KIND,
            Box::new(|| Arc::new(EvaluateVariablesTask::new())),
        );
        registry
    }

    /// Registers a factory, replacing any previous one for the same kind.
    pub fn register(&self, kind: impl Into<String>, factory: TaskFactory) {
        let kind = kind.into();
        tracing::debug!(task_kind = %kind, "Registered task");
        self.factories.write().insert(kind, factory);
    }

    /// Registers a shared instance returned for every lookup of its kind.
    pub fn register_instance(&self, task: Arc<dyn Task>) {
        let kind = task.kind().to_string();
        self.register(kind, Box::new(move || Arc::clone(&task)));
    }

    /// Constructs the task registered under `kind`.
    pub fn create(&self, kind: &str) -> Result<Arc<dyn Task>, StagevarsError> {
        self.factories
            .read()
            .get(kind)
            .map(|factory| factory())
            .ok_or_else(|| StagevarsError::unknown_task(kind))
    }

    /// Checks if a kind is registered.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.read().contains_key(kind)
    }

    /// Lists registered kinds, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.factories.read().keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }
}

impl fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
