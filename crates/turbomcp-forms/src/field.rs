//! Validated field definitions: coercion, constraint checks and schema
//! fragments.
//!
//! Every field runs the same three stages on a raw wire value:
//!
//! 1. **Presence**: a missing key, `null` or `""` is *missing*. Missing values
//!    resolve to the declared default, fail with a required error, or are
//!    omitted from the record.
//! 2. **Coercion**: the raw value is converted to the field's native type.
//! 3. **Constraints**: length, pattern, format, bounds, membership.
//!
//! A present-but-empty string on a required field is a required failure even
//! when a default exists. Only an absent key or `null` falls back to the
//! default.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};

use crate::builders::{DeclaredConstraints, EnumOption, FieldKind, FieldSpec};
use crate::error::{DefinitionError, FieldError, FieldErrorKind};
use crate::schema::{
    self, BooleanSchema, EnumSchema, NumberSchema, PrimitiveSchemaDefinition, StringFormat,
    StringSchema,
};
use crate::value::FieldValue;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)+$")
        .expect("Invalid email regex pattern")
});

/// Words accepted as `true` by every boolean field
pub const DEFAULT_TRUTHY: &[&str] = &["true", "1", "yes", "on"];

/// Words accepted as `false` by every boolean field
pub const DEFAULT_FALSY: &[&str] = &["false", "0", "no", "off"];

/// A checked field declaration bound to a name.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    spec: FieldSpec,
    pattern: Option<Regex>,
}

impl Field {
    /// Check a declaration and bind it to a field name.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] when the name is empty, a pattern does not
    /// compile, bounds are inverted or non-finite, enum options are empty or
    /// repeated, or the default fails the field's own validation.
    pub fn new(name: impl Into<String>, spec: impl Into<FieldSpec>) -> Result<Self, DefinitionError> {
        let name = name.into();
        let spec = spec.into();
        if name.is_empty() {
            return Err(DefinitionError::EmptyFieldName);
        }

        let mut pattern = None;
        match &spec.constraints {
            DeclaredConstraints::String {
                min_length,
                max_length,
                pattern: source,
                ..
            } => {
                check_order(&name, *min_length, *max_length)?;
                if let Some(source) = source {
                    let compiled =
                        Regex::new(source).map_err(|e| DefinitionError::InvalidPattern {
                            field: name.clone(),
                            pattern: source.clone(),
                            reason: e.to_string(),
                        })?;
                    pattern = Some(compiled);
                }
            }
            DeclaredConstraints::Integer { minimum, maximum } => {
                check_order(&name, *minimum, *maximum)?;
            }
            DeclaredConstraints::Number { minimum, maximum } => {
                if minimum.is_some_and(|v| !v.is_finite()) || maximum.is_some_and(|v| !v.is_finite())
                {
                    return Err(DefinitionError::NonFiniteBound(name));
                }
                check_order(&name, *minimum, *maximum)?;
            }
            DeclaredConstraints::Boolean { .. } => {}
            DeclaredConstraints::Enum { options, .. } => {
                if options.is_empty() {
                    return Err(DefinitionError::EmptyEnum(name));
                }
                for (i, option) in options.iter().enumerate() {
                    if options[..i].iter().any(|o| o.value == option.value) {
                        return Err(DefinitionError::DuplicateOption {
                            field: name,
                            value: option.value.clone(),
                        });
                    }
                }
            }
        }

        let field = Self {
            name,
            spec,
            pattern,
        };
        field.check_default()?;
        Ok(field)
    }

    /// Build a field from one property of an elicitation schema.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] for nested or unknown constructs,
    /// constraints on the wrong kind, or any check [`Field::new`] performs.
    pub fn from_schema(
        name: impl Into<String>,
        property: &Value,
        required: bool,
    ) -> Result<Self, DefinitionError> {
        let name = name.into();
        let spec = schema::parse_property(&name, property, required)?;
        Self::new(name, spec)
    }

    /// Field name (the property key)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title
    pub fn title(&self) -> Option<&str> {
        self.spec.title.as_deref()
    }

    /// Description
    pub fn description(&self) -> Option<&str> {
        self.spec.description.as_deref()
    }

    /// Title if declared, otherwise the name
    pub fn label(&self) -> &str {
        self.title().unwrap_or(&self.name)
    }

    /// Field kind
    pub fn kind(&self) -> FieldKind {
        self.spec.kind()
    }

    /// Whether a value must be supplied
    pub fn is_required(&self) -> bool {
        self.spec.required
    }

    /// Declared default
    pub fn default_value(&self) -> Option<&FieldValue> {
        self.spec.default.as_ref()
    }

    /// Enum options, empty for other kinds
    pub fn options(&self) -> &[EnumOption] {
        match &self.spec.constraints {
            DeclaredConstraints::Enum { options, .. } => options,
            _ => &[],
        }
    }

    /// The declaration this field was built from
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Whether the field is listed in the schema's `required` array.
    ///
    /// A required field with a default never blocks submission, so it is
    /// advertised as optional.
    pub fn is_schema_required(&self) -> bool {
        self.spec.required && self.spec.default.is_none()
    }

    /// Run presence, coercion and constraint checks on a raw wire value.
    ///
    /// Returns `Ok(None)` when the value is missing and the field is optional
    /// without a default.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldError`] raised by any stage.
    pub fn clean(&self, raw: Option<&Value>) -> Result<Option<FieldValue>, FieldError> {
        match raw {
            None | Some(Value::Null) => self.resolve_missing(raw),
            Some(Value::String(s)) if s.is_empty() => {
                if self.spec.required {
                    Err(self.required_error(raw))
                } else {
                    Ok(self.spec.default.clone())
                }
            }
            Some(value) => {
                let coerced = self.coerce(value)?;
                self.check(&coerced, value)?;
                Ok(Some(coerced))
            }
        }
    }

    /// Convert a present raw value to the field's native type.
    ///
    /// # Errors
    ///
    /// Returns a coercion [`FieldError`] when the value cannot be converted,
    /// or a constraint error for an enum value outside the option set.
    pub fn coerce(&self, raw: &Value) -> Result<FieldValue, FieldError> {
        let label = self.label();
        match &self.spec.constraints {
            DeclaredConstraints::String { .. } => match raw {
                Value::String(s) => Ok(FieldValue::String(s.clone())),
                _ => Err(self.coercion_error(raw, format!("{label} must be text"))),
            },
            DeclaredConstraints::Integer { .. } => coerce_integer(raw)
                .map(FieldValue::Integer)
                .ok_or_else(|| self.coercion_error(raw, format!("{label} must be a whole number"))),
            DeclaredConstraints::Number { .. } => coerce_number(raw)
                .map(FieldValue::Number)
                .ok_or_else(|| self.coercion_error(raw, format!("{label} must be a number"))),
            DeclaredConstraints::Boolean { truthy, falsy } => coerce_boolean(raw, truthy, falsy)
                .map(FieldValue::Boolean)
                .ok_or_else(|| self.coercion_error(raw, format!("{label} must be yes or no"))),
            DeclaredConstraints::Enum {
                options,
                match_labels,
                ..
            } => {
                let Value::String(input) = raw else {
                    return Err(self.coercion_error(raw, format!("{label} must be text")));
                };
                options
                    .iter()
                    .find(|o| &o.value == input)
                    .or_else(|| {
                        match_labels
                            .then(|| options.iter().find(|o| &o.label == input))
                            .flatten()
                    })
                    .map(|o| FieldValue::String(o.value.clone()))
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                        FieldError::new(
                            &self.name,
                            raw.clone(),
                            FieldErrorKind::Constraint,
                            format!("{label} must be one of: {}", allowed.join(", ")),
                        )
                    })
            }
        }
    }

    /// Check a coerced value against the declared constraints.
    ///
    /// # Errors
    ///
    /// Returns a constraint [`FieldError`] carrying `raw` as the offending
    /// value.
    pub fn check(&self, value: &FieldValue, raw: &Value) -> Result<(), FieldError> {
        let label = self.label();
        let fail = |reason: String| {
            Err(FieldError::new(
                &self.name,
                raw.clone(),
                FieldErrorKind::Constraint,
                reason,
            ))
        };

        match (&self.spec.constraints, value) {
            (
                DeclaredConstraints::String {
                    min_length,
                    max_length,
                    format,
                    ..
                },
                FieldValue::String(s),
            ) => {
                let len = s.chars().count();
                if let Some(min) = min_length.filter(|min| len < *min as usize) {
                    return fail(format!("{label} must be at least {min} characters"));
                }
                if let Some(max) = max_length.filter(|max| len > *max as usize) {
                    return fail(format!("{label} must be at most {max} characters"));
                }
                if let Some(pattern) = &self.pattern {
                    if !pattern.is_match(s) {
                        return fail(format!(
                            "{label} must match the pattern {}",
                            pattern.as_str()
                        ));
                    }
                }
                if let Some(format) = format {
                    if !matches_format(*format, s) {
                        return fail(format!("{label} must be a valid {}", format.as_str()));
                    }
                }
                Ok(())
            }
            (DeclaredConstraints::Integer { minimum, maximum }, FieldValue::Integer(v)) => {
                if let Some(min) = minimum.filter(|min| v < min) {
                    return fail(format!("{label} must be at least {min}"));
                }
                if let Some(max) = maximum.filter(|max| v > max) {
                    return fail(format!("{label} must be at most {max}"));
                }
                Ok(())
            }
            (DeclaredConstraints::Number { minimum, maximum }, FieldValue::Number(v)) => {
                if let Some(min) = minimum.filter(|min| v < min) {
                    return fail(format!("{label} must be at least {min}"));
                }
                if let Some(max) = maximum.filter(|max| v > max) {
                    return fail(format!("{label} must be at most {max}"));
                }
                Ok(())
            }
            (DeclaredConstraints::Boolean { .. }, FieldValue::Boolean(_)) => Ok(()),
            (DeclaredConstraints::Enum { options, .. }, FieldValue::String(s)) => {
                if options.iter().any(|o| &o.value == s) {
                    Ok(())
                } else {
                    fail(format!("{label} is not an allowed option"))
                }
            }
            (_, other) => fail(format!("{label} cannot hold {other}")),
        }
    }

    /// Schema fragment for this field
    pub fn to_schema(&self) -> PrimitiveSchemaDefinition {
        let title = self.spec.title.clone();
        let description = self.spec.description.clone();
        let default = self.spec.default.as_ref().map(FieldValue::to_json);

        match &self.spec.constraints {
            DeclaredConstraints::String {
                min_length,
                max_length,
                pattern,
                format,
            } => PrimitiveSchemaDefinition::String(StringSchema {
                schema_type: "string".to_string(),
                title,
                description,
                min_length: *min_length,
                max_length: *max_length,
                pattern: pattern.clone(),
                format: *format,
                default,
            }),
            DeclaredConstraints::Integer { minimum, maximum } => {
                PrimitiveSchemaDefinition::Number(NumberSchema {
                    schema_type: "integer".to_string(),
                    title,
                    description,
                    minimum: minimum.map(Number::from),
                    maximum: maximum.map(Number::from),
                    default,
                })
            }
            DeclaredConstraints::Number { minimum, maximum } => {
                PrimitiveSchemaDefinition::Number(NumberSchema {
                    schema_type: "number".to_string(),
                    title,
                    description,
                    minimum: minimum.and_then(Number::from_f64),
                    maximum: maximum.and_then(Number::from_f64),
                    default,
                })
            }
            DeclaredConstraints::Boolean { .. } => {
                PrimitiveSchemaDefinition::Boolean(BooleanSchema {
                    schema_type: "boolean".to_string(),
                    title,
                    description,
                    default,
                })
            }
            DeclaredConstraints::Enum {
                options,
                explicit_labels,
                ..
            } => {
                let labelled = *explicit_labels || options.iter().any(|o| o.label != o.value);
                PrimitiveSchemaDefinition::Enum(EnumSchema {
                    schema_type: "string".to_string(),
                    title,
                    description,
                    enum_values: options.iter().map(|o| o.value.clone()).collect(),
                    enum_names: labelled
                        .then(|| options.iter().map(|o| o.label.clone()).collect()),
                    default,
                })
            }
        }
    }

    fn resolve_missing(&self, raw: Option<&Value>) -> Result<Option<FieldValue>, FieldError> {
        match &self.spec.default {
            Some(default) => Ok(Some(default.clone())),
            None if self.spec.required => Err(self.required_error(raw)),
            None => Ok(None),
        }
    }

    fn check_default(&self) -> Result<(), DefinitionError> {
        let Some(default) = &self.spec.default else {
            return Ok(());
        };
        let native = match (self.kind(), default) {
            (_, FieldValue::Null) => return Ok(()),
            (FieldKind::String | FieldKind::Enum, FieldValue::String(_))
            | (FieldKind::Integer, FieldValue::Integer(_))
            | (FieldKind::Number, FieldValue::Number(_))
            | (FieldKind::Boolean, FieldValue::Boolean(_)) => default.clone(),
            (FieldKind::Number, FieldValue::Integer(i)) => FieldValue::Number(*i as f64),
            (kind, other) => {
                return Err(DefinitionError::InvalidDefault {
                    field: self.name.clone(),
                    reason: format!("{other} is not a valid {kind} value"),
                });
            }
        };
        self.check(&native, &native.to_json())
            .map_err(|e| DefinitionError::InvalidDefault {
                field: self.name.clone(),
                reason: e.reason,
            })
    }

    fn required_error(&self, raw: Option<&Value>) -> FieldError {
        FieldError::new(
            &self.name,
            raw.cloned().unwrap_or(Value::Null),
            FieldErrorKind::Required,
            format!("{} is required", self.label()),
        )
    }

    fn coercion_error(&self, raw: &Value, reason: String) -> FieldError {
        FieldError::new(&self.name, raw.clone(), FieldErrorKind::Coercion, reason)
    }
}

fn check_order<T: PartialOrd + ToString>(
    field: &str,
    min: Option<T>,
    max: Option<T>,
) -> Result<(), DefinitionError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(DefinitionError::InvertedBounds {
            field: field.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }),
        _ => Ok(()),
    }
}

fn coerce_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    }
}

fn whole(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

fn coerce_number(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

fn coerce_boolean(raw: &Value, truthy: &[String], falsy: &[String]) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => {
            let word = s.trim().to_lowercase();
            if DEFAULT_TRUTHY.contains(&word.as_str()) || truthy.contains(&word) {
                Some(true)
            } else if DEFAULT_FALSY.contains(&word.as_str()) || falsy.contains(&word) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn matches_format(format: StringFormat, value: &str) -> bool {
    match format {
        StringFormat::Email => EMAIL_REGEX.is_match(value),
        StringFormat::Uri => url::Url::parse(value).is_ok(),
        StringFormat::Date => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        StringFormat::DateTime => chrono::DateTime::parse_from_rfc3339(value).is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{BooleanField, EnumField, IntegerField, NumberField, StringField};
    use serde_json::json;

    fn clean(field: &Field, raw: Value) -> Result<Option<FieldValue>, FieldError> {
        field.clean(Some(&raw))
    }

    #[test]
    fn test_presence_rules() {
        let required = Field::new("name", StringField::new("Name")).unwrap();
        let err = required.clean(None).unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::Required);
        assert_eq!(err.reason, "Name is required");
        assert_eq!(clean(&required, json!("")).unwrap_err().kind, FieldErrorKind::Required);
        assert_eq!(clean(&required, Value::Null).unwrap_err().kind, FieldErrorKind::Required);

        let optional = Field::new("nick", StringField::new("Nickname").optional()).unwrap();
        assert_eq!(optional.clean(None).unwrap(), None);
        assert_eq!(clean(&optional, json!("")).unwrap(), None);

        let defaulted = Field::new("lang", StringField::new("Language").default("en")).unwrap();
        assert_eq!(defaulted.clean(None).unwrap(), Some(FieldValue::from("en")));
        assert_eq!(clean(&defaulted, Value::Null).unwrap(), Some(FieldValue::from("en")));
        // Empty input on a required field is never silently defaulted
        assert_eq!(clean(&defaulted, json!("")).unwrap_err().kind, FieldErrorKind::Required);
        assert!(!defaulted.is_schema_required());
    }

    #[test]
    fn test_integer_coercion() {
        let field = Field::new("age", IntegerField::new("Age").range(0, 150)).unwrap();
        assert_eq!(clean(&field, json!(42)).unwrap(), Some(FieldValue::Integer(42)));
        assert_eq!(clean(&field, json!(" 42 ")).unwrap(), Some(FieldValue::Integer(42)));
        assert_eq!(clean(&field, json!(42.0)).unwrap(), Some(FieldValue::Integer(42)));

        let err = clean(&field, json!(4.5)).unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::Coercion);
        let err = clean(&field, json!("abc")).unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::Coercion);
        assert_eq!(err.value, json!("abc"));
        assert_eq!(clean(&field, json!(true)).unwrap_err().kind, FieldErrorKind::Coercion);

        let err = clean(&field, json!(151)).unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::Constraint);
        assert_eq!(err.reason, "Age must be at most 150");
    }

    #[test]
    fn test_number_coercion_rejects_non_finite() {
        let field = Field::new("ratio", NumberField::new("Ratio").range(0.0, 1.0)).unwrap();
        assert_eq!(clean(&field, json!("0.25")).unwrap(), Some(FieldValue::Number(0.25)));
        assert_eq!(clean(&field, json!(1)).unwrap(), Some(FieldValue::Number(1.0)));
        assert_eq!(clean(&field, json!("NaN")).unwrap_err().kind, FieldErrorKind::Coercion);
        assert_eq!(clean(&field, json!("inf")).unwrap_err().kind, FieldErrorKind::Coercion);
        assert_eq!(clean(&field, json!(1.5)).unwrap_err().kind, FieldErrorKind::Constraint);
    }

    #[test]
    fn test_boolean_words() {
        let field = Field::new("agree", BooleanField::new("Agree").truthy(&["si"])).unwrap();
        for word in ["true", "YES", " on ", "1", "si"] {
            assert_eq!(clean(&field, json!(word)).unwrap(), Some(FieldValue::Boolean(true)));
        }
        for word in ["false", "No", "off", "0"] {
            assert_eq!(clean(&field, json!(word)).unwrap(), Some(FieldValue::Boolean(false)));
        }
        assert_eq!(clean(&field, json!(1)).unwrap(), Some(FieldValue::Boolean(true)));
        assert_eq!(clean(&field, json!(true)).unwrap(), Some(FieldValue::Boolean(true)));
        assert_eq!(clean(&field, json!("maybe")).unwrap_err().kind, FieldErrorKind::Coercion);
        assert_eq!(clean(&field, json!(2)).unwrap_err().kind, FieldErrorKind::Coercion);
    }

    #[test]
    fn test_string_constraints() {
        let field = Field::new(
            "code",
            StringField::new("Code").min_length(2).max_length(4).pattern("[A-Z]+"),
        )
        .unwrap();
        assert_eq!(clean(&field, json!("AB")).unwrap(), Some(FieldValue::from("AB")));
        // Unanchored search
        assert!(clean(&field, json!("xAB")).is_ok());
        assert_eq!(clean(&field, json!("abc")).unwrap_err().kind, FieldErrorKind::Constraint);
        assert_eq!(clean(&field, json!("A")).unwrap_err().kind, FieldErrorKind::Constraint);
        assert_eq!(clean(&field, json!(12)).unwrap_err().kind, FieldErrorKind::Coercion);

        // Length counts characters, not bytes
        let field = Field::new("w", StringField::new("Word").max_length(3)).unwrap();
        assert!(clean(&field, json!("äöü")).is_ok());
    }

    #[test]
    fn test_string_formats() {
        let email = Field::new("email", StringField::new("Email").email()).unwrap();
        assert!(clean(&email, json!("ada@example.com")).is_ok());
        assert_eq!(
            clean(&email, json!("not-an-email")).unwrap_err().reason,
            "Email must be a valid email"
        );

        let uri = Field::new("site", StringField::new("Site").uri()).unwrap();
        assert!(clean(&uri, json!("https://example.com/path")).is_ok());
        assert!(clean(&uri, json!("example dot com")).is_err());

        let date = Field::new("day", StringField::new("Day").date()).unwrap();
        assert!(clean(&date, json!("2024-02-29")).is_ok());
        assert!(clean(&date, json!("2023-02-29")).is_err());

        let stamp = Field::new("at", StringField::new("At").date_time()).unwrap();
        assert!(clean(&stamp, json!("2024-05-01T10:00:00Z")).is_ok());
        assert!(clean(&stamp, json!("2024-05-01 10:00")).is_err());
    }

    #[test]
    fn test_enum_membership_and_labels() {
        let plain = Field::new("size", EnumField::new("Size").options(&["small", "large"])).unwrap();
        assert_eq!(clean(&plain, json!("small")).unwrap(), Some(FieldValue::from("small")));
        let err = clean(&plain, json!("Small")).unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::Constraint);
        assert_eq!(err.reason, "Size must be one of: small, large");

        let labelled = Field::new(
            "size",
            EnumField::new("Size").option("s", "Small").option("l", "Large").match_labels(true),
        )
        .unwrap();
        assert_eq!(clean(&labelled, json!("Large")).unwrap(), Some(FieldValue::from("l")));
        assert_eq!(clean(&labelled, json!("l")).unwrap(), Some(FieldValue::from("l")));
    }

    #[test]
    fn test_definition_errors() {
        assert_eq!(
            Field::new("", StringField::new("X")).unwrap_err(),
            DefinitionError::EmptyFieldName
        );
        assert!(matches!(
            Field::new("p", StringField::new("P").pattern("(")).unwrap_err(),
            DefinitionError::InvalidPattern { .. }
        ));
        assert!(matches!(
            Field::new("n", IntegerField::new("N").range(10, 1)).unwrap_err(),
            DefinitionError::InvertedBounds { .. }
        ));
        assert_eq!(
            Field::new("r", NumberField::new("R").max(f64::NAN)).unwrap_err(),
            DefinitionError::NonFiniteBound("r".to_string())
        );
        assert_eq!(
            Field::new("e", EnumField::new("E")).unwrap_err(),
            DefinitionError::EmptyEnum("e".to_string())
        );
        assert!(matches!(
            Field::new("e", EnumField::new("E").options(&["a", "a"])).unwrap_err(),
            DefinitionError::DuplicateOption { .. }
        ));
        assert!(matches!(
            Field::new("n", IntegerField::new("N").max(5).default(10)).unwrap_err(),
            DefinitionError::InvalidDefault { .. }
        ));
        assert!(matches!(
            Field::new("e", EnumField::new("E").options(&["a"]).default("b")).unwrap_err(),
            DefinitionError::InvalidDefault { .. }
        ));
        // A null default is always allowed
        assert!(Field::new("n", IntegerField::new("N").max(5).default_null()).is_ok());
    }

    #[test]
    fn test_schema_fragments() {
        let field = Field::new("port", IntegerField::new("Port").range(1, 65535).default(8080))
            .unwrap();
        assert_eq!(
            serde_json::to_value(field.to_schema()).unwrap(),
            json!({"type": "integer", "title": "Port", "minimum": 1, "maximum": 65535, "default": 8080})
        );

        let field = Field::new("color", EnumField::new("Color").options(&["red", "green"])).unwrap();
        assert_eq!(
            serde_json::to_value(field.to_schema()).unwrap(),
            json!({"type": "string", "title": "Color", "enum": ["red", "green"], "enumNames": ["Red", "Green"]})
        );

        // Explicit labels are emitted even when they equal the values
        let field = Field::new(
            "color",
            EnumField::new("Color").option("red", "red").option("blue", "blue"),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(field.to_schema()).unwrap(),
            json!({"type": "string", "title": "Color", "enum": ["red", "blue"], "enumNames": ["red", "blue"]})
        );

        // Derived labels that equal their values are left out
        let field = Field::new("unit", EnumField::new("Unit").options(&["Kg", "Lb"])).unwrap();
        let schema = serde_json::to_value(field.to_schema()).unwrap();
        assert!(schema.get("enumNames").is_none());
    }

    #[test]
    fn test_from_schema() {
        let field = Field::from_schema(
            "email",
            &json!({"type": "string", "format": "email", "title": "Email"}),
            true,
        )
        .unwrap();
        assert_eq!(field.kind(), FieldKind::String);
        assert!(field.is_required());
        assert!(clean(&field, json!("bad")).is_err());
    }
}
