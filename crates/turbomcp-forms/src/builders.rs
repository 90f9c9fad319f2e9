//! Field declaration builders.
//!
//! A builder only records what was declared. Consistency checks (regex
//! compilation, bounds, defaults) run when the form definition is built, so
//! every mistake surfaces as a [`DefinitionError`](crate::DefinitionError)
//! at definition time.
//!
//! ```rust
//! use turbomcp_forms::{BooleanField, EnumField, IntegerField, StringField};
//!
//! let name = StringField::new("Your name").min_length(1).max_length(80);
//! let age = IntegerField::new("Age").range(0, 150);
//! let newsletter = BooleanField::new("Subscribe").default(false);
//! let size = EnumField::new("Size").options(&["small", "medium", "large"]);
//! ```

use crate::schema::StringFormat;
use crate::value::FieldValue;

/// Field kinds supported by flat elicitation schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Free text
    String,
    /// Whole number
    Integer,
    /// Floating-point number
    Number,
    /// True/false
    Boolean,
    /// One of a fixed set of string options
    Enum,
}

impl FieldKind {
    /// Kind name as used in JSON Schema `type` (enums are strings)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One option of an enum field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumOption {
    /// Submitted value
    pub value: String,
    /// Display label
    pub label: String,
}

impl EnumOption {
    /// Option with an explicit label
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose label is derived from the value (`in_progress` -> `In Progress`)
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let label = title_case(&value);
        Self { value, label }
    }
}

fn title_case(value: &str) -> String {
    value
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Kind-specific constraints as declared, before consistency checks
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredConstraints {
    /// String constraints
    String {
        /// Minimum length in characters
        min_length: Option<u32>,
        /// Maximum length in characters
        max_length: Option<u32>,
        /// Regex pattern (JSON Schema semantics: unanchored)
        pattern: Option<String>,
        /// Format hint
        format: Option<StringFormat>,
    },
    /// Integer bounds
    Integer {
        /// Inclusive lower bound
        minimum: Option<i64>,
        /// Inclusive upper bound
        maximum: Option<i64>,
    },
    /// Number bounds
    Number {
        /// Inclusive lower bound
        minimum: Option<f64>,
        /// Inclusive upper bound
        maximum: Option<f64>,
    },
    /// Extra boolean words on top of the default set
    Boolean {
        /// Additional words meaning `true`
        truthy: Vec<String>,
        /// Additional words meaning `false`
        falsy: Vec<String>,
    },
    /// Enum options
    Enum {
        /// Ordered options
        options: Vec<EnumOption>,
        /// Also accept an option's label as input
        match_labels: bool,
        /// Labels were given explicitly rather than derived from values
        explicit_labels: bool,
    },
}

impl DeclaredConstraints {
    /// Kind these constraints belong to
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::String { .. } => FieldKind::String,
            Self::Integer { .. } => FieldKind::Integer,
            Self::Number { .. } => FieldKind::Number,
            Self::Boolean { .. } => FieldKind::Boolean,
            Self::Enum { .. } => FieldKind::Enum,
        }
    }
}

/// An unchecked field declaration.
///
/// Produced by the typed builders below (or by schema ingestion) and turned
/// into a [`Field`](crate::Field) when the form definition is built.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Display title
    pub title: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Whether a value must be supplied
    pub required: bool,
    /// Default value used when input is missing
    pub default: Option<FieldValue>,
    /// Kind-specific constraints
    pub constraints: DeclaredConstraints,
}

impl FieldSpec {
    fn new(constraints: DeclaredConstraints) -> Self {
        Self {
            title: None,
            description: None,
            required: true,
            default: None,
            constraints,
        }
    }

    /// Kind of the declared field
    pub fn kind(&self) -> FieldKind {
        self.constraints.kind()
    }
}

macro_rules! common_builder_methods {
    () => {
        /// Set the display title
        pub fn title(mut self, title: impl Into<String>) -> Self {
            self.0.title = Some(title.into());
            self
        }

        /// Set the description
        pub fn description(mut self, desc: impl Into<String>) -> Self {
            self.0.description = Some(desc.into());
            self
        }

        /// Set whether the field is required (default: true)
        pub fn required(mut self, required: bool) -> Self {
            self.0.required = required;
            self
        }

        /// Mark the field as optional
        pub fn optional(self) -> Self {
            self.required(false)
        }

        /// Declare `null` as the default for a missing value
        pub fn default_null(mut self) -> Self {
            self.0.default = Some(FieldValue::Null);
            self
        }

        /// Finish the declaration
        pub fn build(self) -> FieldSpec {
            self.0
        }
    };
}

/// Builder for string fields
#[derive(Debug, Clone)]
pub struct StringField(FieldSpec);

impl StringField {
    /// Create a string field with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self(FieldSpec::new(DeclaredConstraints::String {
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
        }))
        .title(title)
    }

    common_builder_methods!();

    /// Set the default value
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.0.default = Some(FieldValue::String(value.into()));
        self
    }

    /// Set the minimum length (characters)
    pub fn min_length(mut self, len: u32) -> Self {
        if let DeclaredConstraints::String { min_length, .. } = &mut self.0.constraints {
            *min_length = Some(len);
        }
        self
    }

    /// Set the maximum length (characters)
    pub fn max_length(mut self, len: u32) -> Self {
        if let DeclaredConstraints::String { max_length, .. } = &mut self.0.constraints {
            *max_length = Some(len);
        }
        self
    }

    /// Add a regex pattern constraint
    pub fn pattern(mut self, regex: impl Into<String>) -> Self {
        if let DeclaredConstraints::String { pattern, .. } = &mut self.0.constraints {
            *pattern = Some(regex.into());
        }
        self
    }

    /// Set the string format hint
    pub fn format(mut self, value: StringFormat) -> Self {
        if let DeclaredConstraints::String { format, .. } = &mut self.0.constraints {
            *format = Some(value);
        }
        self
    }

    /// Set the format to email
    pub fn email(self) -> Self {
        self.format(StringFormat::Email)
    }

    /// Set the format to URI
    pub fn uri(self) -> Self {
        self.format(StringFormat::Uri)
    }

    /// Set the format to date (YYYY-MM-DD)
    pub fn date(self) -> Self {
        self.format(StringFormat::Date)
    }

    /// Set the format to date-time (RFC 3339)
    pub fn date_time(self) -> Self {
        self.format(StringFormat::DateTime)
    }
}

/// Builder for integer fields
#[derive(Debug, Clone)]
pub struct IntegerField(FieldSpec);

impl IntegerField {
    /// Create an integer field with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self(FieldSpec::new(DeclaredConstraints::Integer {
            minimum: None,
            maximum: None,
        }))
        .title(title)
    }

    common_builder_methods!();

    /// Set the default value
    pub fn default(mut self, value: i64) -> Self {
        self.0.default = Some(FieldValue::Integer(value));
        self
    }

    /// Set the inclusive minimum
    pub fn min(mut self, value: i64) -> Self {
        if let DeclaredConstraints::Integer { minimum, .. } = &mut self.0.constraints {
            *minimum = Some(value);
        }
        self
    }

    /// Set the inclusive maximum
    pub fn max(mut self, value: i64) -> Self {
        if let DeclaredConstraints::Integer { maximum, .. } = &mut self.0.constraints {
            *maximum = Some(value);
        }
        self
    }

    /// Set both bounds
    pub fn range(self, min: i64, max: i64) -> Self {
        self.min(min).max(max)
    }
}

/// Builder for number fields
#[derive(Debug, Clone)]
pub struct NumberField(FieldSpec);

impl NumberField {
    /// Create a number field with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self(FieldSpec::new(DeclaredConstraints::Number {
            minimum: None,
            maximum: None,
        }))
        .title(title)
    }

    common_builder_methods!();

    /// Set the default value
    pub fn default(mut self, value: f64) -> Self {
        self.0.default = Some(FieldValue::Number(value));
        self
    }

    /// Set the inclusive minimum
    pub fn min(mut self, value: f64) -> Self {
        if let DeclaredConstraints::Number { minimum, .. } = &mut self.0.constraints {
            *minimum = Some(value);
        }
        self
    }

    /// Set the inclusive maximum
    pub fn max(mut self, value: f64) -> Self {
        if let DeclaredConstraints::Number { maximum, .. } = &mut self.0.constraints {
            *maximum = Some(value);
        }
        self
    }

    /// Set both bounds
    pub fn range(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }
}

/// Builder for boolean fields
#[derive(Debug, Clone)]
pub struct BooleanField(FieldSpec);

impl BooleanField {
    /// Create a boolean field with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self(FieldSpec::new(DeclaredConstraints::Boolean {
            truthy: Vec::new(),
            falsy: Vec::new(),
        }))
        .title(title)
    }

    common_builder_methods!();

    /// Set the default value
    pub fn default(mut self, value: bool) -> Self {
        self.0.default = Some(FieldValue::Boolean(value));
        self
    }

    /// Accept additional words as `true` (case-insensitive)
    pub fn truthy<T: AsRef<str>>(mut self, words: &[T]) -> Self {
        if let DeclaredConstraints::Boolean { truthy, .. } = &mut self.0.constraints {
            truthy.extend(words.iter().map(|w| w.as_ref().to_lowercase()));
        }
        self
    }

    /// Accept additional words as `false` (case-insensitive)
    pub fn falsy<T: AsRef<str>>(mut self, words: &[T]) -> Self {
        if let DeclaredConstraints::Boolean { falsy, .. } = &mut self.0.constraints {
            falsy.extend(words.iter().map(|w| w.as_ref().to_lowercase()));
        }
        self
    }
}

/// Builder for enum fields
#[derive(Debug, Clone)]
pub struct EnumField(FieldSpec);

impl EnumField {
    /// Create an enum field with a title and no options yet
    pub fn new(title: impl Into<String>) -> Self {
        Self(FieldSpec::new(DeclaredConstraints::Enum {
            options: Vec::new(),
            match_labels: false,
            explicit_labels: false,
        }))
        .title(title)
    }

    common_builder_methods!();

    /// Set the default value (must be one of the option values)
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.0.default = Some(FieldValue::String(value.into()));
        self
    }

    /// Add one option with an explicit label
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        if let DeclaredConstraints::Enum {
            options,
            explicit_labels,
            ..
        } = &mut self.0.constraints
        {
            options.push(EnumOption::new(value, label));
            *explicit_labels = true;
        }
        self
    }

    /// Add options whose labels are derived from their values
    pub fn options<T: AsRef<str>>(mut self, values: &[T]) -> Self {
        if let DeclaredConstraints::Enum { options, .. } = &mut self.0.constraints {
            options.extend(values.iter().map(|v| EnumOption::from_value(v.as_ref())));
        }
        self
    }

    /// Alias for [`options`](Self::options)
    pub fn choices<T: AsRef<str>>(self, values: &[T]) -> Self {
        self.options(values)
    }

    /// Accept an option's label as input as well as its value
    pub fn match_labels(mut self, enabled: bool) -> Self {
        if let DeclaredConstraints::Enum { match_labels, .. } = &mut self.0.constraints {
            *match_labels = enabled;
        }
        self
    }
}

macro_rules! into_spec {
    ($($builder:ty),*) => {
        $(
            impl From<$builder> for FieldSpec {
                fn from(val: $builder) -> Self {
                    val.0
                }
            }
        )*
    };
}

into_spec!(StringField, IntegerField, NumberField, BooleanField, EnumField);
