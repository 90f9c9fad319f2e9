//! Native field values and the validated data record.

use std::fmt;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A coerced, validated field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Number (floating-point) value
    Number(f64),
    /// String value (string and enum fields)
    String(String),
    /// Explicit null, only ever produced from a declared `null` default
    Null,
}

impl FieldValue {
    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as number; integers widen
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this is the explicit null value
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert to a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            Self::Boolean(b) => Value::Bool(*b),
            Self::Integer(i) => Value::from(*i),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::Null => Value::Null,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Errors from typed access to [`FormData`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    /// No value under this name
    #[error("Field '{0}' not found")]
    Missing(String),

    /// The value exists but has another type
    #[error("Field '{field}' is not {expected}")]
    WrongType {
        /// Field name
        field: String,
        /// Requested type
        expected: &'static str,
    },

    /// Conversion into a user struct failed
    #[error("Failed to deserialize form data: {0}")]
    Deserialize(String),
}

/// Validated data record of one form, keyed by field name in field order.
///
/// Only fields that were present in the input, or that resolved to a
/// declared default, appear here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    values: IndexMap<String, FieldValue>,
}

impl FormData {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw value for a field
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Whether the record holds a value for this field
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Get a string field
    pub fn get_str(&self, name: &str) -> Result<&str, DataError> {
        self.require(name)?.as_str().ok_or(DataError::WrongType {
            field: name.to_string(),
            expected: "a string",
        })
    }

    /// Get a field with type inference
    pub fn get<T: FromFieldValue>(&self, name: &str) -> Result<T, DataError> {
        let value = self.require(name)?;
        T::from_field_value(value).ok_or(DataError::WrongType {
            field: name.to_string(),
            expected: T::EXPECTED,
        })
    }

    /// Get a field, or `None` when it is absent
    pub fn get_opt<T: FromFieldValue>(&self, name: &str) -> Result<Option<T>, DataError> {
        match self.values.get(name) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(_) => self.get(name).map(Some),
        }
    }

    /// Number of fields in the record
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge another record into this one; values from `other` win on collision
    pub fn merge(&mut self, other: &FormData) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// Convert to a JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Deserialize the record into a user-defined struct
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DataError> {
        serde_json::from_value(self.to_json()).map_err(|e| DataError::Deserialize(e.to_string()))
    }

    fn require(&self, name: &str) -> Result<&FieldValue, DataError> {
        self.values
            .get(name)
            .ok_or_else(|| DataError::Missing(name.to_string()))
    }
}

impl<'a> IntoIterator for &'a FormData {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = indexmap::map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromIterator<(String, FieldValue)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Trait for extracting typed values from form data
pub trait FromFieldValue: Sized {
    /// Description used in type mismatch errors
    const EXPECTED: &'static str;

    /// Convert, or `None` on type mismatch
    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

impl FromFieldValue for String {
    const EXPECTED: &'static str = "a string";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromFieldValue for i64 {
    const EXPECTED: &'static str = "an integer";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_integer()
    }
}

impl FromFieldValue for i32 {
    const EXPECTED: &'static str = "a 32-bit integer";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_integer().and_then(|v| i32::try_from(v).ok())
    }
}

impl FromFieldValue for u32 {
    const EXPECTED: &'static str = "an unsigned 32-bit integer";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_integer().and_then(|v| u32::try_from(v).ok())
    }
}

impl FromFieldValue for f64 {
    const EXPECTED: &'static str = "a number";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_number()
    }
}

impl FromFieldValue for bool {
    const EXPECTED: &'static str = "a boolean";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_boolean()
    }
}

impl FromFieldValue for FieldValue {
    const EXPECTED: &'static str = "a value";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        Some(value.clone())
    }
}
