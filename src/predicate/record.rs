// SPDX-License-Identifier: MIT

//! Persisted form of a predicate and restoring predicates from it
//!
//! Restoring never fails: references to models, paths or operators that are
//! no longer available are skipped with a warning and the predicate is left
//! partially bound.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use super::binding::PredicateKind;
use super::Predicate;
use crate::datamodel::registry::ModelRegistry;
use crate::datamodel::value::{convert, TypeDescriptor};
use crate::error::{EngineError, PredicateError};
use crate::operator::registry::OperatorRegistry;

/// Storage record for one predicate
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PersistedPredicate {
    #[serde(default)]
    pub predicate_type: PredicateKind,
    pub left_model_id: Option<Uuid>,
    pub left_path: Option<String>,
    /// Plugin providing the operator
    pub operator_plugin_id: Option<Uuid>,
    /// Operator kind name within its plugin
    pub operator_type: Option<String>,
    pub right_model_id: Option<Uuid>,
    pub right_path: Option<String>,
    /// JSON encoding of the static literal
    pub right_static_value: Option<String>,
}

impl PersistedPredicate {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read a record from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

/// JSON encoding of a literal; absence is `null`
pub fn encode_literal(literal: Option<&Value>) -> String {
    literal.map_or_else(|| Value::Null.to_string(), Value::to_string)
}

/// Decode a persisted literal, converting it to `hint` when possible
pub fn decode_literal(
    json: &str,
    hint: Option<&TypeDescriptor>,
) -> Result<Option<Value>, serde_json::Error> {
    let value: Value = serde_json::from_str(json)?;
    if value.is_null() {
        return Ok(None);
    }

    let value = match hint {
        Some(ty) => convert(&value, ty.kind).unwrap_or(value),
        None => value,
    };
    Ok(Some(value))
}

impl Predicate {
    /// Snapshot the predicate's references for storage
    pub fn to_record(&self) -> PersistedPredicate {
        let binding = &self.binding;
        let left = binding.left();
        let operator = binding.bound_operator();
        let right = binding.right_dynamic();

        PersistedPredicate {
            predicate_type: binding.kind(),
            left_model_id: left.map(|l| l.model_id()),
            left_path: left.map(|l| l.path().to_string()),
            operator_plugin_id: operator.map(|o| o.plugin_id()),
            operator_type: operator.map(|o| o.kind().to_string()),
            right_model_id: right.map(|r| r.model_id()),
            right_path: right.map(|r| r.path().to_string()),
            right_static_value: match binding.kind() {
                PredicateKind::Static => Some(encode_literal(binding.right_literal())),
                PredicateKind::Dynamic => None,
            },
        }
    }

    /// Rebuild a predicate from a record against the currently registered
    /// models and operators
    pub fn from_record(
        record: &PersistedPredicate,
        models: &ModelRegistry,
        operators: &OperatorRegistry,
    ) -> Self {
        let mut predicate = Predicate::new();
        predicate.binding.set_kind(record.predicate_type);

        // Left side
        if let Some(id) = record.left_model_id {
            let model = models.resolve(&id);
            match (model, record.left_path.as_deref()) {
                (Some(model), Some(path)) if model.contains_path(path) => {
                    absorb("left operand", predicate.set_left(Some(&model), Some(path)));
                }
                _ => log::warn!(
                    "Left side {}:{:?} is not available, leaving it empty",
                    id,
                    record.left_path
                ),
            }
        }

        // Operator
        if let (Some(plugin_id), Some(kind)) =
            (record.operator_plugin_id, record.operator_type.as_deref())
        {
            match operators.resolve(&plugin_id, kind) {
                Some(operator) => {
                    absorb(
                        "operator",
                        predicate.set_operator(Some(&operator)).map(|_| ()),
                    );
                }
                None => log::warn!("Operator {}:{} is not registered", plugin_id, kind),
            }
        }

        // Right side, dynamic
        if let Some(id) = record.right_model_id {
            let model = models.resolve(&id);
            match (model, record.right_path.as_deref()) {
                (Some(model), Some(path)) if model.contains_path(path) => {
                    absorb(
                        "right operand",
                        predicate
                            .set_right_dynamic(Some(&model), Some(path))
                            .map(|_| ()),
                    );
                }
                _ => log::warn!(
                    "Right side {}:{:?} is not available, leaving it empty",
                    id,
                    record.right_path
                ),
            }
        }
        // Right side, static
        else if let Some(json) = &record.right_static_value {
            // The left type helps decode ambiguous literals
            let hint = predicate.binding.left_type();
            match decode_literal(json, hint.as_ref()) {
                Ok(literal) => absorb("static value", predicate.set_right_static(literal)),
                Err(e) => log::warn!("Ignoring undecodable static value {:?}: {}", json, e),
            }
        }

        predicate
    }
}

fn absorb(what: &str, result: Result<(), PredicateError>) {
    if let Err(e) = result {
        log::warn!("Failed to restore {}: {}", what, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::value::ValueKind;
    use serde_json::json;

    #[test]
    fn test_encode_literal() {
        assert_eq!(encode_literal(Some(&json!(30))), "30");
        assert_eq!(encode_literal(Some(&json!("hot"))), "\"hot\"");
        assert_eq!(encode_literal(None), "null");
    }

    #[test]
    fn test_decode_literal_with_hint() {
        let int = TypeDescriptor::new(ValueKind::Integer);

        assert_eq!(decode_literal("30", Some(&int)).unwrap(), Some(json!(30)));
        assert_eq!(decode_literal("\"30\"", Some(&int)).unwrap(), Some(json!(30)));
        assert_eq!(decode_literal("30.0", Some(&int)).unwrap(), Some(json!(30)));
        assert_eq!(decode_literal("null", Some(&int)).unwrap(), None);
    }

    #[test]
    fn test_decode_literal_without_hint() {
        assert_eq!(decode_literal("\"30\"", None).unwrap(), Some(json!("30")));
        assert_eq!(decode_literal("[1,2]", None).unwrap(), Some(json!([1, 2])));
    }

    #[test]
    fn test_decode_literal_keeps_unconvertible_value() {
        let int = TypeDescriptor::new(ValueKind::Integer);
        assert_eq!(
            decode_literal("\"warm\"", Some(&int)).unwrap(),
            Some(json!("warm"))
        );
    }

    #[test]
    fn test_decode_literal_invalid_json() {
        assert!(decode_literal("{not json", None).is_err());
    }

    #[test]
    fn test_record_json_shape() {
        let record = PersistedPredicate {
            predicate_type: PredicateKind::Static,
            left_path: Some("Temperature".to_string()),
            operator_type: Some("GreaterThan".to_string()),
            right_static_value: Some("30".to_string()),
            ..Default::default()
        };

        let json = record.to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["predicate_type"], json!("Static"));
        assert_eq!(value["left_path"], json!("Temperature"));
        assert_eq!(value["right_model_id"], Value::Null);

        assert_eq!(PersistedPredicate::from_json(&json).unwrap(), record);
    }

    #[test]
    fn test_load_reports_io_and_json_errors() {
        let result = PersistedPredicate::load("/nonexistent/predicate.json");
        assert!(matches!(result, Err(EngineError::Io(_))));

        let path = std::env::temp_dir().join(format!("predicate-{}.json", Uuid::new_v4()));
        fs::write(&path, "{\"left_path\": 42}").unwrap();
        let result = PersistedPredicate::load(&path);
        assert!(matches!(result, Err(EngineError::Json(_))));

        fs::write(&path, "{\"left_path\": \"Temperature\"}").unwrap();
        let record = PersistedPredicate::load(&path).unwrap();
        assert_eq!(record.left_path.as_deref(), Some("Temperature"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_record_missing_fields_default() {
        let record = PersistedPredicate::from_json("{}").unwrap();
        assert_eq!(record, PersistedPredicate::default());
    }
}
