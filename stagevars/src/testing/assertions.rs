//! Test assertions for task results.

use crate::core::{ExecutionStatus, TaskResult};

/// Asserts that the result reports `SUCCEEDED`.
pub fn assert_succeeded(result: &TaskResult) {
    assert_eq!(
        result.status(),
        ExecutionStatus::Succeeded,
        "Expected SUCCEEDED, got {}",
        result.status()
    );
}

/// Asserts that the result contains a specific output key.
pub fn assert_output_contains(result: &TaskResult, key: &str) {
    assert!(
        result.output(key).is_some(),
        "Expected outputs to contain key '{}', but they don't. Keys: {:?}",
        key,
        result.outputs().keys().collect::<Vec<_>>()
    );
}

/// Asserts that the outputs equal the given JSON object exactly.
pub fn assert_outputs_eq(result: &TaskResult, expected: &serde_json::Value) {
    let actual = serde_json::Value::Object(
        result
            .outputs()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    );
    assert_eq!(&actual, expected, "Outputs mismatch");
}
