//! Property-based tests for field coercion, validation and schema generation
//!
//! Uses proptest to verify:
//! - Integer and number round-trips inside declared bounds
//! - Exactly one error per violating field, in declaration order
//! - Deterministic schema output and required-list contents
//! - Case-insensitive boolean words

use proptest::prelude::*;
use serde_json::{Map, Value, json};
use turbomcp_forms::{
    BooleanField, FieldErrorKind, FieldValue, FormDefinition, IntegerField, NumberField,
    StringField,
};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Strategy for `(min, max, value)` with `min <= value <= max`
fn bounded_integer() -> impl Strategy<Value = (i64, i64, i64)> {
    (-1_000_000i64..1_000_000, 0i64..1_000_000)
        .prop_flat_map(|(min, span)| (Just(min), Just(min + span), min..=min + span))
}

// =============================================================================
// COERCION ROUND-TRIPS
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: in-bounds integer text coerces to the same integer
    #[test]
    fn prop_integer_text_round_trips((min, max, value) in bounded_integer()) {
        let form = FormDefinition::builder("n")
            .field("n", IntegerField::new("N").range(min, max))
            .build()
            .unwrap();

        let data = form.validate(&object(json!({"n": value.to_string()}))).unwrap();
        prop_assert_eq!(data.value("n"), Some(&FieldValue::Integer(value)));

        let data = form.validate(&object(json!({"n": value}))).unwrap();
        prop_assert_eq!(data.get::<i64>("n").unwrap(), value);
    }

    /// Property: an integer above the maximum yields exactly one constraint error
    #[test]
    fn prop_integer_above_max_is_one_constraint_error(
        (min, max, _value) in bounded_integer(),
        excess in 1i64..1000,
    ) {
        let form = FormDefinition::builder("n")
            .field("n", IntegerField::new("N").range(min, max))
            .build()
            .unwrap();

        let errors = form
            .validate(&object(json!({"n": (max + excess).to_string()})))
            .unwrap_err();
        prop_assert_eq!(errors.len(), 1);
        prop_assert_eq!(errors.errors()[0].kind, FieldErrorKind::Constraint);
    }

    /// Property: finite floats inside bounds survive text coercion unchanged
    #[test]
    fn prop_number_round_trips(value in -1.0e9f64..1.0e9) {
        let form = FormDefinition::builder("x")
            .field("x", NumberField::new("X").range(-1.0e9, 1.0e9))
            .build()
            .unwrap();

        let data = form.validate(&object(json!({"x": value.to_string()}))).unwrap();
        prop_assert_eq!(data.get::<f64>("x").unwrap(), value);
    }

    /// Property: boolean words match regardless of case and padding
    #[test]
    fn prop_boolean_words_case_insensitive(
        word in prop::sample::select(vec!["true", "yes", "on", "1", "false", "no", "off", "0"]),
        upper in prop::collection::vec(any::<bool>(), 5),
        pad in 0usize..3,
    ) {
        let mixed: String = word
            .chars()
            .zip(upper.iter().cycle())
            .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
            .collect();
        let raw = format!("{}{}{}", " ".repeat(pad), mixed, " ".repeat(pad));
        let expected = matches!(word, "true" | "yes" | "on" | "1");

        let form = FormDefinition::builder("b")
            .field("b", BooleanField::new("B"))
            .build()
            .unwrap();
        let data = form.validate(&object(json!({"b": raw}))).unwrap();
        prop_assert_eq!(data.get::<bool>("b").unwrap(), expected);
    }

    /// Property: string length bounds count characters
    #[test]
    fn prop_string_length_bounds(text in "\\PC{0,20}", max in 0u32..20) {
        let form = FormDefinition::builder("s")
            .field("s", StringField::new("S").max_length(max).optional())
            .build()
            .unwrap();

        let result = form.validate(&object(json!({"s": text.clone()})));
        let len = text.chars().count();
        if text.is_empty() || len <= max as usize {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result.unwrap_err().len(), 1);
        }
    }
}

// =============================================================================
// MULTI-FIELD ERROR REPORTS
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: violating N distinct fields yields exactly N errors in declaration order
    #[test]
    fn prop_errors_one_per_violating_field(violations in prop::collection::vec(any::<bool>(), 1..8)) {
        let builder = (0..violations.len()).fold(FormDefinition::builder("many"), |b, i| {
            b.field(format!("f{i}"), IntegerField::new(format!("F{i}")).range(0, 10))
        });
        let form = builder.build().unwrap();

        let content: Map<String, Value> = violations
            .iter()
            .enumerate()
            .map(|(i, bad)| (format!("f{i}"), if *bad { json!("abc") } else { json!("5") }))
            .collect();
        let expected: Vec<String> = violations
            .iter()
            .enumerate()
            .filter(|(_, bad)| **bad)
            .map(|(i, _)| format!("f{i}"))
            .collect();

        match form.validate(&content) {
            Ok(data) => {
                prop_assert!(expected.is_empty());
                prop_assert_eq!(data.len(), violations.len());
            }
            Err(errors) => {
                let fields: Vec<String> = errors.fields().map(str::to_string).collect();
                prop_assert_eq!(fields, expected);
                prop_assert!(errors.errors().iter().all(|e| e.kind == FieldErrorKind::Coercion));
            }
        }
    }

    /// Property: schema output is byte-identical across builds and `required`
    /// lists exactly the required fields without a default
    #[test]
    fn prop_schema_deterministic(flags in prop::collection::vec((any::<bool>(), any::<bool>()), 0..8)) {
        let build = || {
            flags
                .iter()
                .enumerate()
                .fold(FormDefinition::builder("form"), |b, (i, (required, defaulted))| {
                    let mut field = StringField::new(format!("Field {i}")).required(*required);
                    if *defaulted {
                        field = field.default("x");
                    }
                    b.field(format!("f{i}"), field)
                })
                .build()
                .unwrap()
        };

        let first = serde_json::to_string(build().schema()).unwrap();
        let second = serde_json::to_string(build().schema()).unwrap();
        prop_assert_eq!(&first, &second);

        let expected: Vec<String> = flags
            .iter()
            .enumerate()
            .filter(|(_, (required, defaulted))| *required && !*defaulted)
            .map(|(i, _)| format!("f{i}"))
            .collect();
        prop_assert_eq!(build().required_fields().to_vec(), expected);
    }
}

// =============================================================================
// BOUNDARY SCENARIOS
// =============================================================================

#[test]
fn test_integer_boundary_scenario() {
    let form = FormDefinition::builder("rating")
        .field("rating", IntegerField::new("Rating").range(1, 5))
        .build()
        .unwrap();

    let data = form.validate(&object(json!({"rating": "5"}))).unwrap();
    assert_eq!(data.get::<i64>("rating").unwrap(), 5);

    let errors = form.validate(&object(json!({"rating": "6"}))).unwrap_err();
    assert_eq!(errors.errors()[0].kind, FieldErrorKind::Constraint);

    let errors = form.validate(&object(json!({"rating": "abc"}))).unwrap_err();
    assert_eq!(errors.errors()[0].kind, FieldErrorKind::Coercion);
}
