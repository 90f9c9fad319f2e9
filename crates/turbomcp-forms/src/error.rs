//! Error types for form definition, validation and elicitation.
//!
//! Errors fall into four classes:
//!
//! - [`DefinitionError`]: a form or field was declared inconsistently. Raised
//!   when the definition is built, never while validating input.
//! - [`ValidationErrors`]: one or more field-level failures, collected in
//!   field declaration order. Always recoverable (re-prompt the user).
//! - [`FormError::NotSupported`]: the remote side cannot do structured
//!   elicitation at all, so callers can fall back to a non-interactive path.
//! - Protocol errors (malformed or unknown replies) are *not* errors here:
//!   they resolve to a cancelled outcome.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Boxed error returned by server-authored hook code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for elicitation operations.
pub type FormResult<T> = Result<T, FormError>;

/// Errors raised while declaring a field or form, or while ingesting a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    /// A field name was empty
    #[error("Field name must not be empty")]
    EmptyFieldName,

    /// A form declared the same field twice
    #[error("Field '{0}' is declared more than once")]
    DuplicateField(String),

    /// A regex pattern failed to compile
    #[error("Field '{field}' has an invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Field name
        field: String,
        /// The offending pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// Lower bound is greater than upper bound
    #[error("Field '{field}' has inverted bounds: {min} > {max}")]
    InvertedBounds {
        /// Field name
        field: String,
        /// Declared lower bound
        min: String,
        /// Declared upper bound
        max: String,
    },

    /// A numeric bound was NaN or infinite
    #[error("Field '{0}' has a non-finite bound")]
    NonFiniteBound(String),

    /// An enum field declared no options
    #[error("Enum field '{0}' declares no options")]
    EmptyEnum(String),

    /// An enum field declared the same value twice
    #[error("Enum field '{field}' declares option '{value}' more than once")]
    DuplicateOption {
        /// Field name
        field: String,
        /// Repeated option value
        value: String,
    },

    /// The declared default does not pass the field's own validation
    #[error("Field '{field}' has an invalid default: {reason}")]
    InvalidDefault {
        /// Field name
        field: String,
        /// Why the default was rejected
        reason: String,
    },

    /// A constraint was attached to a kind that cannot carry it
    #[error("Field '{field}' of kind '{kind}' cannot carry constraint '{constraint}'")]
    ConstraintMismatch {
        /// Field name
        field: String,
        /// Field kind
        kind: String,
        /// Constraint keyword
        constraint: String,
    },

    /// `enumNames` and `enum` have different lengths
    #[error("Enum field '{field}' has {values} values but {labels} labels")]
    LabelMismatch {
        /// Field name
        field: String,
        /// Number of enum values
        values: usize,
        /// Number of labels
        labels: usize,
    },

    /// A schema construct that a flat elicitation form cannot represent
    #[error("Field '{field}' is not representable in a flat elicitation schema: {reason}")]
    Unrepresentable {
        /// Field name, or `<root>` for the object itself
        field: String,
        /// What was found
        reason: String,
    },

    /// An override named a field the form does not declare
    #[error("Form '{form}' has no field '{field}' to override")]
    UnknownField {
        /// Form name
        form: String,
        /// Requested field name
        field: String,
    },

    /// A wizard chained more steps than the configured maximum
    #[error("Wizard exceeded the maximum of {0} steps")]
    WizardTooLong(usize),
}

/// Field name under which form-level validation failures are reported
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Which stage of the pipeline rejected a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldErrorKind {
    /// A required value was missing or empty
    Required,
    /// The raw value could not be converted to the field's native type
    Coercion,
    /// The converted value violated a declared constraint
    Constraint,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("required"),
            Self::Coercion => f.write_str("coercion"),
            Self::Constraint => f.write_str("constraint"),
        }
    }
}

/// A single field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{field}: {reason}")]
pub struct FieldError {
    /// Name of the field that failed
    pub field: String,
    /// The raw value as delivered by the transport (`null` when missing)
    pub value: Value,
    /// Stage that rejected the value
    pub kind: FieldErrorKind,
    /// Human-readable reason
    pub reason: String,
}

impl FieldError {
    /// Create a new field error
    pub fn new(
        field: impl Into<String>,
        value: Value,
        kind: FieldErrorKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value,
            kind,
            reason: reason.into(),
        }
    }

    /// A form-level failure, reported under [`NON_FIELD_ERRORS`]
    pub fn form(reason: impl Into<String>) -> Self {
        Self::new(NON_FIELD_ERRORS, Value::Null, FieldErrorKind::Constraint, reason)
    }

    /// Whether this failure belongs to the form rather than one field
    pub fn is_form_level(&self) -> bool {
        self.field == NON_FIELD_ERRORS
    }
}

/// The complete, ordered list of field errors from one validation run.
///
/// Never empty: the pipeline only builds one when at least one field failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }

    pub(crate) fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// All field errors in field declaration order
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The error reported for a given field, if any
    pub fn for_field(&self, name: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == name)
    }

    /// Names of the failing fields, in order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Errors surfaced by an elicitation or a wizard run.
#[derive(Debug, Error)]
pub enum FormError {
    /// The form or wizard was declared inconsistently
    #[error("Invalid form definition: {0}")]
    Definition(#[from] DefinitionError),

    /// The client accepted, but the submitted content failed validation
    #[error("Form validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The remote side cannot perform structured elicitation
    #[error("Client does not support elicitation: {0}")]
    NotSupported(String),

    /// A server-authored hook returned an error
    #[error("Form hook failed: {0}")]
    Hook(#[source] BoxError),

    /// The form instance or wizard already ran; create a new one to retry
    #[error("Form instance or wizard has already run")]
    AlreadyElicited,
}

impl FormError {
    /// Whether the caller can recover by re-prompting the user
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the caller should fall back to a non-interactive path
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }

    /// The validation report, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_errors_display_keeps_order() {
        let errors = ValidationErrors::new(vec![
            FieldError::new("name", json!(""), FieldErrorKind::Required, "Name is required"),
            FieldError::new(
                "age",
                json!("abc"),
                FieldErrorKind::Coercion,
                "Age must be an integer",
            ),
        ]);

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "name: Name is required; age: Age must be an integer"
        );
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(
            errors.for_field("age").map(|e| e.kind),
            Some(FieldErrorKind::Coercion)
        );
    }

    #[test]
    fn test_form_error_classification() {
        let err = FormError::NotSupported("no elicitation capability".to_string());
        assert!(err.is_not_supported());
        assert!(!err.is_validation());
        assert!(err.validation_errors().is_none());

        let err: FormError = ValidationErrors::new(vec![FieldError::new(
            "x",
            Value::Null,
            FieldErrorKind::Required,
            "X is required",
        )])
        .into();
        assert!(err.is_validation());
        assert_eq!(err.validation_errors().map(ValidationErrors::len), Some(1));
    }

    #[test]
    fn test_form_level_error() {
        let err = FieldError::form("Passwords do not match");
        assert!(err.is_form_level());
        assert_eq!(err.to_string(), "__all__: Passwords do not match");
        assert!(!FieldError::new("x", Value::Null, FieldErrorKind::Required, "r").is_form_level());
    }

    #[test]
    fn test_field_error_serde() {
        let err = FieldError::new("port", json!("99999"), FieldErrorKind::Constraint, "too big");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "constraint");
        assert_eq!(json["value"], "99999");
    }
}
