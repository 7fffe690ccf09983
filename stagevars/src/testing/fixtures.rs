//! Test fixtures for task testing.

use std::collections::HashMap;

use crate::context::{StageExecutionContext, Variable, VARIABLES_FIELD};

/// A stage context builder.
#[derive(Debug, Default)]
pub struct TestStageContext {
    /// Plain context entries.
    pub data: HashMap<String, serde_json::Value>,
    /// Variables written under the reserved field, if any.
    pub variables: Option<Vec<Variable>>,
}

impl TestStageContext {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plain entry to the context.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Appends a variable.
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.variables
            .get_or_insert_with(Vec::new)
            .push(Variable::new(key, value));
        self
    }

    /// Sets the full variable list, which may be empty.
    #[must_use]
    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Builds the stage context.
    ///
    /// Variables, when set, overwrite any plain entry under the reserved field.
    #[must_use]
    pub fn build(&self) -> StageExecutionContext {
        let mut data = self.data.clone();
        if let Some(ref variables) = self.variables {
            let encoded = variables
                .iter()
                .map(|v| {
                    let mut entry = serde_json::Map::new();
                    entry.insert("key".to_string(), serde_json::json!(v.key));
                    entry.insert("value".to_string(), v.value.clone());
                    serde_json::Value::Object(entry)
                })
                .collect();
            data.insert(VARIABLES_FIELD.to_string(), serde_json::Value::Array(encoded));
        }
        StageExecutionContext::from_data(data)
    }
}
