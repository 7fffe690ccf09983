//! Tests for context projection.

#[cfg(test)]
mod tests {
    use crate::context::{
        parse_stage_context, serialize_context, EvaluateVariablesContext, StageExecutionContext,
        Variable, VariableSet, VARIABLES_FIELD,
    };
    use crate::errors::INPUT_SHAPE_CODE;
    use pretty_assertions::assert_eq;

    fn context(value: serde_json::Value) -> StageExecutionContext {
        StageExecutionContext::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_absent_variables() {
        let view = parse_stage_context(&context(serde_json::json!({"other": 1}))).unwrap();
        assert!(view.variables.is_empty());
    }

    #[test]
    fn test_parse_null_variables() {
        let view = parse_stage_context(&context(serde_json::json!({"variables": null}))).unwrap();
        assert!(view.variables.is_empty());
    }

    #[test]
    fn test_parse_preserves_order() {
        let view = parse_stage_context(&context(serde_json::json!({
            "variables": [
                {"key": "b", "value": 1},
                {"key": "a", "value": 2},
                {"key": "b", "value": 3}
            ]
        })))
        .unwrap();

        let keys: Vec<&str> = view.variables.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_stage_context(&context(serde_json::json!({"variables": {"a": 1}})))
            .unwrap_err();

        assert_eq!(err.field, VARIABLES_FIELD);
        assert_eq!(err.error_info.code, INPUT_SHAPE_CODE);
        assert!(err.message.contains("an object"));
    }

    #[test]
    fn test_parse_rejects_structured_key() {
        let err = parse_stage_context(&context(serde_json::json!({
            "variables": [{"key": {"name": "a"}, "value": 1}]
        })))
        .unwrap_err();

        assert_eq!(err.field, VARIABLES_FIELD);
        assert!(err.message.contains("invalid variable key"));
    }

    #[test]
    fn test_parse_accepts_numeric_key_as_text() {
        let parsed = parse_stage_context(&context(serde_json::json!({
            "variables": [{"key": 42, "value": 1}]
        })))
        .unwrap();

        assert_eq!(
            parsed.variables.to_outputs(),
            [("42".to_string(), serde_json::json!(1))]
                .into_iter()
                .collect::<std::collections::HashMap<_, _>>()
        );
    }

    #[test]
    fn test_parse_rejects_scalar_entry() {
        let result = parse_stage_context(&context(serde_json::json!({"variables": ["a"]})));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_context_round_trips_view() {
        let view = EvaluateVariablesContext {
            variables: VariableSet::new().with(Variable::new("a", serde_json::json!([1, 2]))),
        };

        let map = serialize_context(&view).unwrap();
        let reparsed = parse_stage_context(&StageExecutionContext::from_data(map)).unwrap();
        assert_eq!(reparsed, view);
    }

    #[test]
    fn test_serialize_context_rejects_scalars() {
        assert!(serialize_context(&42).is_err());
    }
}
