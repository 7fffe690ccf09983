//! Tests for TaskResult.

#[cfg(test)]
mod tests {
    use crate::core::{ExecutionStatus, TaskResult};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_succeeded_is_empty() {
        let result = TaskResult::succeeded();
        assert_eq!(result.status(), ExecutionStatus::Succeeded);
        assert!(result.context().is_empty());
        assert!(result.outputs().is_empty());
    }

    #[test]
    fn test_builder_sets_all_parts() {
        let mut context = HashMap::new();
        context.insert("region".to_string(), serde_json::json!("us-east-1"));

        let result = TaskResult::builder(ExecutionStatus::Succeeded)
            .context(context.clone())
            .output("image", serde_json::json!("app:1.2"))
            .build();

        assert_eq!(result.context(), &context);
        assert_eq!(result.output("image"), Some(&serde_json::json!("app:1.2")));
        assert_eq!(result.output("missing"), None);
    }

    #[test]
    fn test_outputs_replaces_previous_entries() {
        let mut outputs = HashMap::new();
        outputs.insert("b".to_string(), serde_json::json!(2));

        let result = TaskResult::builder(ExecutionStatus::Succeeded)
            .output("a", serde_json::json!(1))
            .outputs(outputs.clone())
            .build();

        assert_eq!(result.outputs(), &outputs);
    }

    #[test]
    fn test_into_parts() {
        let result = TaskResult::builder(ExecutionStatus::Terminal)
            .output("k", serde_json::json!(null))
            .build();

        let (status, context, outputs) = result.into_parts();
        assert_eq!(status, ExecutionStatus::Terminal);
        assert!(context.is_empty());
        assert_eq!(outputs.get("k"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn test_serialized_shape() {
        let result = TaskResult::builder(ExecutionStatus::Succeeded)
            .output("a", serde_json::json!({"x": 1}))
            .build();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "SUCCEEDED");
        assert_eq!(json["outputs"]["a"]["x"], 1);
        assert!(json["context"].as_object().unwrap().is_empty());
    }
}
