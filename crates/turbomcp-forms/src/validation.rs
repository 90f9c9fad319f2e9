//! Validation pipeline: raw content mapping to validated [`FormData`].

use serde_json::{Map, Value};

use crate::error::{FieldError, ValidationErrors};
use crate::field::Field;
use crate::value::FormData;

/// Validate raw content against an ordered set of fields.
///
/// Every field is processed in order and all failures are collected; the
/// first error never hides the rest. Keys that no field declares are ignored.
///
/// # Errors
///
/// Returns [`ValidationErrors`] holding one entry per failing field, in field
/// order.
pub fn validate(fields: &[Field], content: &Map<String, Value>) -> Result<FormData, ValidationErrors> {
    let mut data = FormData::new();
    let mut errors: Vec<FieldError> = Vec::new();

    for field in fields {
        match field.clean(content.get(field.name())) {
            Ok(Some(value)) => data.insert(field.name(), value),
            Ok(None) => {}
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(data)
    } else {
        Err(ValidationErrors::new(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{BooleanField, IntegerField, StringField};
    use crate::error::FieldErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields() -> Vec<Field> {
        vec![
            Field::new("name", StringField::new("Name").min_length(1)).unwrap(),
            Field::new("age", IntegerField::new("Age").range(1, 5)).unwrap(),
            Field::new("subscribe", BooleanField::new("Subscribe").default(false)).unwrap(),
            Field::new("nickname", StringField::new("Nickname").optional()).unwrap(),
        ]
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_success_applies_defaults_and_omits_missing_optionals() {
        let data = validate(
            &fields(),
            &object(json!({"name": "Ada", "age": "5", "trace_id": "ignored"})),
        )
        .unwrap();

        assert_eq!(data.to_json(), json!({"name": "Ada", "age": 5, "subscribe": false}));
        assert!(!data.contains("nickname"));
        assert!(!data.contains("trace_id"));
    }

    #[test]
    fn test_collects_every_error_in_field_order() {
        let errors = validate(
            &fields(),
            &object(json!({"subscribe": "maybe", "age": "abc"})),
        )
        .unwrap_err();

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name", "age", "subscribe"]);
        let kinds: Vec<FieldErrorKind> = errors.errors().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FieldErrorKind::Required,
                FieldErrorKind::Coercion,
                FieldErrorKind::Coercion
            ]
        );
    }

    #[test]
    fn test_single_violation_reports_single_error() {
        let errors = validate(&fields(), &object(json!({"name": "Ada", "age": "6"}))).unwrap_err();
        assert_eq!(errors.len(), 1);
        let error = &errors.errors()[0];
        assert_eq!(error.field, "age");
        assert_eq!(error.kind, FieldErrorKind::Constraint);
        assert_eq!(error.value, json!("6"));
    }
}
