//! Restricted JSON Schema for elicitation requests.
//!
//! Elicitation schemas are flat objects whose properties are primitive
//! schemas only: no nesting, no arrays, no cross-field constraints. This
//! module holds the wire types, the generator that turns a set of fields into
//! a schema, and the strict parser that turns a schema back into field
//! declarations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::builders::{DeclaredConstraints, EnumOption, FieldSpec};
use crate::error::DefinitionError;
use crate::field::Field;
use crate::value::FieldValue;

/// Elicitation create request sent through the transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElicitationRequest {
    /// The message to present to the user
    pub message: String,

    /// A restricted subset of JSON Schema
    #[serde(rename = "requestedSchema")]
    pub requested_schema: ElicitationSchema,
}

/// Restricted schema for elicitation requests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElicitationSchema {
    /// Always "object"
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Properties in field declaration order
    pub properties: IndexMap<String, PrimitiveSchemaDefinition>,

    /// Required property names, omitted when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl ElicitationSchema {
    /// Create an empty object schema
    pub fn new() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: IndexMap::new(),
            required: None,
        }
    }

    /// Required property names (empty when none)
    pub fn required_names(&self) -> &[String] {
        self.required.as_deref().unwrap_or(&[])
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Default for ElicitationSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Primitive schema definitions allowed in elicitation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimitiveSchemaDefinition {
    /// String field schema
    String(StringSchema),
    /// Number or integer field schema
    Number(NumberSchema),
    /// Boolean field schema
    Boolean(BooleanSchema),
    /// Enum field schema
    Enum(EnumSchema),
}

/// String schema definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringSchema {
    /// Type discriminator
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Minimum length
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,

    /// Maximum length
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    /// Regex pattern
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Format hint (email, uri, date, date-time)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<StringFormat>,

    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Supported string formats per MCP spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringFormat {
    /// Email format
    Email,
    /// URI format
    Uri,
    /// Date format (YYYY-MM-DD)
    Date,
    /// Date-time format (RFC 3339)
    #[serde(rename = "date-time")]
    DateTime,
}

impl StringFormat {
    /// Keyword as it appears in the schema
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Uri => "uri",
            Self::Date => "date",
            Self::DateTime => "date-time",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "email" => Some(Self::Email),
            "uri" => Some(Self::Uri),
            "date" => Some(Self::Date),
            "date-time" => Some(Self::DateTime),
            _ => None,
        }
    }
}

/// Number schema definition (supports both number and integer)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberSchema {
    /// Type discriminator ("number" or "integer")
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Minimum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,

    /// Maximum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,

    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Boolean schema definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanSchema {
    /// Type discriminator
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Enum schema definition (string enumerations)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumSchema {
    /// Type discriminator (always "string" for enums)
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Allowed values
    #[serde(rename = "enum")]
    pub enum_values: Vec<String>,

    /// Display names for enum values
    #[serde(rename = "enumNames", skip_serializing_if = "Option::is_none")]
    pub enum_names: Option<Vec<String>>,

    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Generate the elicitation schema for an ordered set of fields.
///
/// `properties` follow field order and `required` lists, in the same order,
/// every field that is required and has no default. The output for a given
/// field set is always identical.
///
/// # Errors
///
/// Returns a [`DefinitionError`] if two fields share a name or a field cannot
/// be expressed as a flat primitive property.
pub fn generate<'a, I>(fields: I) -> Result<ElicitationSchema, DefinitionError>
where
    I: IntoIterator<Item = &'a Field>,
{
    let mut schema = ElicitationSchema::new();
    let mut required = Vec::new();

    for field in fields {
        if field.name().is_empty() {
            return Err(DefinitionError::EmptyFieldName);
        }
        if schema.properties.contains_key(field.name()) {
            return Err(DefinitionError::DuplicateField(field.name().to_string()));
        }
        if let PrimitiveSchemaDefinition::Enum(e) = field.to_schema() {
            if e.enum_values.is_empty() {
                return Err(DefinitionError::EmptyEnum(field.name().to_string()));
            }
        }

        schema
            .properties
            .insert(field.name().to_string(), field.to_schema());
        if field.is_schema_required() {
            required.push(field.name().to_string());
        }
    }

    if !required.is_empty() {
        schema.required = Some(required);
    }
    Ok(schema)
}

const NESTING_KEYWORDS: &[&str] = &[
    "properties",
    "items",
    "additionalProperties",
    "$ref",
    "oneOf",
    "anyOf",
    "allOf",
    "not",
    "if",
    "dependentRequired",
];

const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern", "format"];
const NUMERIC_KEYWORDS: &[&str] = &["minimum", "maximum"];

/// Parse a flat elicitation object schema into ordered field declarations.
///
/// Fields listed in `required` are declared required, all others optional.
///
/// # Errors
///
/// Returns a [`DefinitionError`] for anything a flat form cannot represent.
pub fn parse_object(schema: &Value) -> Result<Vec<(String, FieldSpec)>, DefinitionError> {
    let root = "<root>".to_string();
    let obj = schema
        .as_object()
        .ok_or_else(|| unrepresentable(&root, "schema is not an object"))?;

    match obj.get("type").and_then(Value::as_str) {
        Some("object") | None => {}
        Some(other) => {
            return Err(unrepresentable(
                &root,
                format!("root type must be 'object', found '{other}'"),
            ));
        }
    }

    let required: Vec<&str> = match obj.get("required") {
        None => Vec::new(),
        Some(Value::Array(names)) => names
            .iter()
            .map(|n| {
                n.as_str()
                    .ok_or_else(|| unrepresentable(&root, "required names must be strings"))
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(unrepresentable(&root, "required must be an array")),
    };

    let empty = Map::new();
    let properties = match obj.get("properties") {
        None => &empty,
        Some(Value::Object(props)) => props,
        Some(_) => return Err(unrepresentable(&root, "properties must be an object")),
    };

    if let Some(unknown) = required.iter().find(|n| !properties.contains_key(**n)) {
        return Err(unrepresentable(
            &root,
            format!("required name '{unknown}' has no property"),
        ));
    }

    properties
        .iter()
        .map(|(name, property)| {
            let spec = parse_property(name, property, required.contains(&name.as_str()))?;
            Ok((name.clone(), spec))
        })
        .collect()
}

/// Parse one property schema into a field declaration.
///
/// # Errors
///
/// Returns a [`DefinitionError`] for nested or unknown constructs and for
/// constraints attached to the wrong kind.
pub fn parse_property(
    name: &str,
    property: &Value,
    required: bool,
) -> Result<FieldSpec, DefinitionError> {
    let obj = property
        .as_object()
        .ok_or_else(|| unrepresentable(name, "property schema is not an object"))?;

    if let Some(keyword) = NESTING_KEYWORDS.iter().find(|k| obj.contains_key(**k)) {
        return Err(unrepresentable(name, format!("'{keyword}' is not allowed")));
    }

    let constraints = if let Some(values) = obj.get("enum") {
        parse_enum(name, obj, values)?
    } else {
        let kind = obj
            .get("type")
            .ok_or_else(|| unrepresentable(name, "missing 'type'"))?
            .as_str()
            .ok_or_else(|| unrepresentable(name, "'type' must be a single string"))?;
        if obj.contains_key("enumNames") {
            return Err(mismatch(name, kind, "enumNames"));
        }
        match kind {
            "string" => DeclaredConstraints::String {
                min_length: get_u32(name, obj, "minLength")?,
                max_length: get_u32(name, obj, "maxLength")?,
                pattern: get_str(name, obj, "pattern")?,
                format: match get_str(name, obj, "format")? {
                    None => None,
                    Some(format) => Some(StringFormat::parse(&format).ok_or_else(|| {
                        unrepresentable(name, format!("unknown format '{format}'"))
                    })?),
                },
            },
            "integer" => {
                reject(name, kind, obj, STRING_KEYWORDS)?;
                DeclaredConstraints::Integer {
                    minimum: get_i64(name, obj, "minimum")?,
                    maximum: get_i64(name, obj, "maximum")?,
                }
            }
            "number" => {
                reject(name, kind, obj, STRING_KEYWORDS)?;
                DeclaredConstraints::Number {
                    minimum: get_f64(name, obj, "minimum")?,
                    maximum: get_f64(name, obj, "maximum")?,
                }
            }
            "boolean" => {
                reject(name, kind, obj, STRING_KEYWORDS)?;
                reject(name, kind, obj, NUMERIC_KEYWORDS)?;
                DeclaredConstraints::Boolean {
                    truthy: Vec::new(),
                    falsy: Vec::new(),
                }
            }
            "object" | "array" => {
                return Err(unrepresentable(name, format!("type '{kind}' is not flat")));
            }
            other => return Err(unrepresentable(name, format!("unknown type '{other}'"))),
        }
    };

    if matches!(constraints, DeclaredConstraints::String { .. }) {
        reject(name, "string", obj, NUMERIC_KEYWORDS)?;
    }

    let default = match obj.get("default") {
        None => None,
        Some(Value::Null) => Some(FieldValue::Null),
        Some(value) => Some(default_value(name, &constraints, value)?),
    };

    Ok(FieldSpec {
        title: get_str(name, obj, "title")?,
        description: get_str(name, obj, "description")?,
        required,
        default,
        constraints,
    })
}

fn parse_enum(
    name: &str,
    obj: &Map<String, Value>,
    values: &Value,
) -> Result<DeclaredConstraints, DefinitionError> {
    match obj.get("type").and_then(Value::as_str) {
        Some("string") | None => {}
        Some(other) => {
            return Err(unrepresentable(
                name,
                format!("enum of type '{other}' is not supported"),
            ));
        }
    }
    reject(name, "enum", obj, STRING_KEYWORDS)?;
    reject(name, "enum", obj, NUMERIC_KEYWORDS)?;

    let values = string_array(name, values, "enum")?;
    let explicit_labels = obj.contains_key("enumNames");
    let labels = match obj.get("enumNames") {
        None => values.clone(),
        Some(names) => {
            let labels = string_array(name, names, "enumNames")?;
            if labels.len() != values.len() {
                return Err(DefinitionError::LabelMismatch {
                    field: name.to_string(),
                    values: values.len(),
                    labels: labels.len(),
                });
            }
            labels
        }
    };

    Ok(DeclaredConstraints::Enum {
        options: values
            .into_iter()
            .zip(labels)
            .map(|(value, label)| EnumOption::new(value, label))
            .collect(),
        match_labels: false,
        explicit_labels,
    })
}

fn default_value(
    name: &str,
    constraints: &DeclaredConstraints,
    value: &Value,
) -> Result<FieldValue, DefinitionError> {
    let converted = match (constraints, value) {
        (DeclaredConstraints::String { .. } | DeclaredConstraints::Enum { .. }, Value::String(s)) => {
            Some(FieldValue::String(s.clone()))
        }
        (DeclaredConstraints::Integer { .. }, Value::Number(n)) => n.as_i64().map(FieldValue::Integer),
        (DeclaredConstraints::Number { .. }, Value::Number(n)) => n.as_f64().map(FieldValue::Number),
        (DeclaredConstraints::Boolean { .. }, Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
        _ => None,
    };
    converted.ok_or_else(|| DefinitionError::InvalidDefault {
        field: name.to_string(),
        reason: format!("{value} does not match the field type"),
    })
}

fn reject(
    name: &str,
    kind: &str,
    obj: &Map<String, Value>,
    keywords: &[&str],
) -> Result<(), DefinitionError> {
    match keywords.iter().find(|k| obj.contains_key(**k)) {
        Some(keyword) => Err(mismatch(name, kind, keyword)),
        None => Ok(()),
    }
}

fn string_array(name: &str, value: &Value, keyword: &str) -> Result<Vec<String>, DefinitionError> {
    value
        .as_array()
        .ok_or_else(|| unrepresentable(name, format!("'{keyword}' must be an array")))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| unrepresentable(name, format!("'{keyword}' entries must be strings")))
        })
        .collect()
}

fn get_str(
    name: &str,
    obj: &Map<String, Value>,
    keyword: &str,
) -> Result<Option<String>, DefinitionError> {
    match obj.get(keyword) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(unrepresentable(name, format!("'{keyword}' must be a string"))),
    }
}

fn get_u32(
    name: &str,
    obj: &Map<String, Value>,
    keyword: &str,
) -> Result<Option<u32>, DefinitionError> {
    match obj.get(keyword) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| unrepresentable(name, format!("'{keyword}' must be a small non-negative integer"))),
    }
}

fn get_i64(
    name: &str,
    obj: &Map<String, Value>,
    keyword: &str,
) -> Result<Option<i64>, DefinitionError> {
    match obj.get(keyword) {
        None => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| unrepresentable(name, format!("'{keyword}' must be an integer"))),
    }
}

fn get_f64(
    name: &str,
    obj: &Map<String, Value>,
    keyword: &str,
) -> Result<Option<f64>, DefinitionError> {
    match obj.get(keyword) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| unrepresentable(name, format!("'{keyword}' must be a number"))),
    }
}

fn unrepresentable(field: &str, reason: impl Into<String>) -> DefinitionError {
    DefinitionError::Unrepresentable {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn mismatch(field: &str, kind: &str, constraint: &str) -> DefinitionError {
    DefinitionError::ConstraintMismatch {
        field: field.to_string(),
        kind: kind.to_string(),
        constraint: constraint.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::FieldKind;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = ElicitationRequest {
            message: "Please provide your configuration".to_string(),
            requested_schema: ElicitationSchema::new(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"], "Please provide your configuration");
        assert_eq!(json["requestedSchema"]["type"], "object");
        assert_eq!(json["requestedSchema"]["properties"], json!({}));
        assert!(json["requestedSchema"].get("required").is_none());
    }

    #[test]
    fn test_parse_property_kinds() {
        let spec = parse_property(
            "port",
            &json!({"type": "integer", "title": "Port", "minimum": 1, "maximum": 65535}),
            true,
        )
        .unwrap();
        assert_eq!(spec.kind(), FieldKind::Integer);
        assert!(spec.required);
        assert_eq!(spec.title.as_deref(), Some("Port"));

        let spec = parse_property(
            "size",
            &json!({"type": "string", "enum": ["s", "m"], "enumNames": ["Small", "Medium"]}),
            false,
        )
        .unwrap();
        assert_eq!(spec.kind(), FieldKind::Enum);

        // Labels equal to their values still survive a round trip
        let property = json!({"type": "string", "enum": ["a", "b"], "enumNames": ["a", "b"]});
        let field = crate::Field::from_schema("letter", &property, true).unwrap();
        assert_eq!(serde_json::to_value(field.to_schema()).unwrap(), property);

        let spec = parse_property("email", &json!({"type": "string", "format": "email"}), true)
            .unwrap();
        assert_eq!(spec.kind(), FieldKind::String);
    }

    #[test]
    fn test_parse_property_rejects_nesting() {
        let err = parse_property("address", &json!({"type": "object", "properties": {}}), true)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Unrepresentable { .. }));

        let err = parse_property("tags", &json!({"type": "array"}), true).unwrap_err();
        assert!(matches!(err, DefinitionError::Unrepresentable { .. }));

        let err = parse_property("x", &json!({"anyOf": [{"type": "string"}]}), true).unwrap_err();
        assert!(matches!(err, DefinitionError::Unrepresentable { .. }));
    }

    #[test]
    fn test_parse_property_rejects_constraint_on_wrong_kind() {
        let err = parse_property("age", &json!({"type": "integer", "pattern": "^\\d+$"}), true)
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::ConstraintMismatch {
                field: "age".to_string(),
                kind: "integer".to_string(),
                constraint: "pattern".to_string(),
            }
        );

        let err = parse_property("name", &json!({"type": "string", "minimum": 3}), true)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::ConstraintMismatch { .. }));

        let err = parse_property("ok", &json!({"type": "boolean", "maxLength": 3}), true)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::ConstraintMismatch { .. }));
    }

    #[test]
    fn test_parse_object_required_must_exist() {
        let err = parse_object(&json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["b"]
        }))
        .unwrap_err();
        assert!(matches!(err, DefinitionError::Unrepresentable { .. }));
    }

    #[test]
    fn test_parse_enum_label_mismatch() {
        let err = parse_property(
            "size",
            &json!({"enum": ["s", "m"], "enumNames": ["Small"]}),
            true,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::LabelMismatch {
                field: "size".to_string(),
                values: 2,
                labels: 1,
            }
        );
    }

    #[test]
    fn test_parse_default_type_mismatch() {
        let err = parse_property("n", &json!({"type": "integer", "default": "five"}), false)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidDefault { .. }));
    }
}
