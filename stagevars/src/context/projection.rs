//! Projection of opaque stage contexts into typed task views, and back.

use super::stage::json_kind;
use super::{StageExecutionContext, VariableSet, VARIABLES_FIELD};
use crate::errors::{InputShapeError, StagevarsError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Typed view of a stage context as seen by the variable evaluation task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluateVariablesContext {
    /// The evaluated variables, in upstream order.
    #[serde(default)]
    pub variables: VariableSet,
}

/// Parses a stage context into an [`EvaluateVariablesContext`].
///
/// An absent or null `variables` field yields an empty set. Anything that
/// is not a sequence of variable objects is an [`InputShapeError`].
pub fn parse_stage_context(
    stage: &StageExecutionContext,
) -> Result<EvaluateVariablesContext, InputShapeError> {
    let variables = match stage.get(VARIABLES_FIELD) {
        None | Some(serde_json::Value::Null) => VariableSet::new(),
        Some(raw @ serde_json::Value::Array(_)) => VariableSet::deserialize(raw)
            .map_err(|e| InputShapeError::new(VARIABLES_FIELD, e.to_string()))?,
        Some(other) => {
            return Err(InputShapeError::new(
                VARIABLES_FIELD,
                format!("expected an array of variables, found {}", json_kind(other)),
            ));
        }
    };

    Ok(EvaluateVariablesContext { variables })
}

/// Serializes a typed context view back into the map form stored by the engine.
pub fn serialize_context<T: Serialize>(
    view: &T,
) -> Result<HashMap<String, serde_json::Value>, StagevarsError> {
    match serde_json::to_value(view)? {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(StagevarsError::Serialization(format!(
            "context view serialized to {}, expected an object",
            json_kind(&other)
        ))),
    }
}
