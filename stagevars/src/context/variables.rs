//! Variables produced by upstream expression evaluation.

use super::stage::json_kind;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Reserved stage context field holding the variable set.
pub const VARIABLES_FIELD: &str = "variables";

/// A single already-evaluated key/value pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// The output key. Missing or null keys deserialize as empty.
    #[serde(default, deserialize_with = "nullable_key")]
    pub key: String,
    /// The evaluated value.
    #[serde(default)]
    pub value: serde_json::Value,
    /// Free-form description from the stage configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The expression the value was evaluated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_expression: Option<String>,
}

/// Reads a key as text. Null becomes the empty (inert) key and scalar keys
/// use their JSON text; objects and arrays are rejected.
fn nullable_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(key)) => Ok(key),
        Some(serde_json::Value::Number(key)) => Ok(key.to_string()),
        Some(serde_json::Value::Bool(key)) => Ok(key.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "invalid variable key: expected a string, found {}",
            json_kind(&other)
        ))),
    }
}

impl Variable {
    /// Creates a new variable.
    #[must_use]
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
            description: None,
            source_expression: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the source expression.
    #[must_use]
    pub fn with_source_expression(mut self, expression: impl Into<String>) -> Self {
        self.source_expression = Some(expression.into());
        self
    }

    /// A variable is publishable when its key is non-empty after trimming.
    ///
    /// Anything else is an inert placeholder left by the evaluation phase.
    #[must_use]
    pub fn is_publishable(&self) -> bool {
        !self.key.trim().is_empty()
    }
}

/// An ordered sequence of variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableSet(Vec<Variable>);

impl VariableSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable.
    #[must_use]
    pub fn with(mut self, variable: Variable) -> Self {
        self.0.push(variable);
        self
    }

    /// Returns the number of variables, inert ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set holds no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all variables in order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.0.iter()
    }

    /// Iterates over publishable variables in order.
    pub fn publishable(&self) -> impl Iterator<Item = &Variable> {
        self.0.iter().filter(|v| v.is_publishable())
    }

    /// Positions of variables that will not be published.
    #[must_use]
    pub fn inert_positions(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_publishable())
            .map(|(i, _)| i)
            .collect()
    }

    /// Publishable keys occurring more than once, in order of first occurrence.
    #[must_use]
    pub fn shadowed_keys(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order = Vec::new();

        for variable in self.publishable() {
            let count = counts.entry(variable.key.as_str()).or_insert(0);
            if *count == 0 {
                order.push(variable.key.as_str());
            }
            *count += 1;
        }

        order
            .into_iter()
            .filter(|key| counts.get(key).copied().unwrap_or(0) > 1)
            .map(String::from)
            .collect()
    }

    /// Folds the set into an outputs mapping.
    ///
    /// Inert variables are dropped and later variables overwrite earlier ones
    /// with the same key. Keys are used verbatim.
    #[must_use]
    pub fn to_outputs(&self) -> HashMap<String, serde_json::Value> {
        let mut outputs = HashMap::new();
        for variable in self.publishable() {
            outputs.insert(variable.key.clone(), variable.value.clone());
        }
        outputs
    }
}

impl From<Vec<Variable>> for VariableSet {
    fn from(variables: Vec<Variable>) -> Self {
        Self(variables)
    }
}

impl FromIterator<Variable> for VariableSet {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for VariableSet {
    type Item = Variable;
    type IntoIter = std::vec::IntoIter<Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_publishable_trims_key() {
        assert!(Variable::new("a", serde_json::json!(1)).is_publishable());
        assert!(Variable::new(" a ", serde_json::json!(1)).is_publishable());
        assert!(!Variable::new("", serde_json::json!(1)).is_publishable());
        assert!(!Variable::new(" \t\n", serde_json::json!(1)).is_publishable());
    }

    #[test]
    fn test_deserialize_full_variable() {
        let variable: Variable = serde_json::from_value(serde_json::json!({
            "key": "image",
            "value": "app:1.2",
            "description": "resolved image",
            "sourceExpression": "${trigger.tag}"
        }))
        .unwrap();

        assert_eq!(variable.key, "image");
        assert_eq!(variable.description.as_deref(), Some("resolved image"));
        assert_eq!(variable.source_expression.as_deref(), Some("${trigger.tag}"));
    }

    #[test]
    fn test_deserialize_missing_or_null_key_is_inert() {
        let missing: Variable = serde_json::from_value(serde_json::json!({"value": 1})).unwrap();
        let null: Variable =
            serde_json::from_value(serde_json::json!({"key": null, "value": 1})).unwrap();

        assert!(!missing.is_publishable());
        assert!(!null.is_publishable());
    }

    #[test]
    fn test_deserialize_scalar_key_as_text() {
        let number: Variable =
            serde_json::from_value(serde_json::json!({"key": 42, "value": 1})).unwrap();
        let float: Variable =
            serde_json::from_value(serde_json::json!({"key": 1.5, "value": 1})).unwrap();
        let boolean: Variable =
            serde_json::from_value(serde_json::json!({"key": true, "value": 1})).unwrap();

        assert_eq!(number.key, "42");
        assert_eq!(float.key, "1.5");
        assert_eq!(boolean.key, "true");
    }

    #[test]
    fn test_deserialize_rejects_structured_key() {
        let object = serde_json::from_value::<Variable>(serde_json::json!({"key": {"a": 1}}));
        let array = serde_json::from_value::<Variable>(serde_json::json!({"key": ["a"]}));

        assert!(object.unwrap_err().to_string().contains("an object"));
        assert!(array.unwrap_err().to_string().contains("an array"));
    }

    #[test]
    fn test_deserialize_missing_value_is_null() {
        let variable: Variable = serde_json::from_value(serde_json::json!({"key": "a"})).unwrap();
        assert_eq!(variable.value, serde_json::Value::Null);
    }

    #[test]
    fn test_inert_positions() {
        let set = VariableSet::from(vec![
            Variable::new("", serde_json::json!(1)),
            Variable::new("b", serde_json::json!(2)),
            Variable::new("   ", serde_json::json!(3)),
        ]);

        assert_eq!(set.inert_positions(), vec![0, 2]);
        assert_eq!(set.publishable().count(), 1);
    }

    #[test]
    fn test_shadowed_keys() {
        let set = VariableSet::from(vec![
            Variable::new("a", serde_json::json!(1)),
            Variable::new("b", serde_json::json!(2)),
            Variable::new("a", serde_json::json!(3)),
            Variable::new("", serde_json::json!(4)),
            Variable::new("", serde_json::json!(5)),
        ]);

        assert_eq!(set.shadowed_keys(), vec!["a".to_string()]);
    }

    #[test]
    fn test_to_outputs_last_write_wins() {
        let set = VariableSet::new()
            .with(Variable::new("a", serde_json::json!(1)))
            .with(Variable::new("a", serde_json::json!(2)));

        let outputs = set.to_outputs();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs.get("a"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_to_outputs_keeps_key_verbatim() {
        let set = VariableSet::new().with(Variable::new(" padded ", serde_json::json!(true)));
        let outputs = set.to_outputs();

        assert!(outputs.contains_key(" padded "));
        assert!(!outputs.contains_key("padded"));
    }
}
