//! Form definitions: the ordered, named field table of one form type.
//!
//! A definition is built once and never changes afterwards. Its schema is
//! generated during [`FormBuilder::build`], so any field that cannot be
//! expressed as a flat elicitation schema fails there and not on first use.
//! Share definitions across tasks with [`Arc`](std::sync::Arc).
//!
//! ```rust
//! use turbomcp_forms::{FormDefinition, IntegerField, StringField};
//!
//! let contact = FormDefinition::builder("contact")
//!     .field("name", StringField::new("Name"))
//!     .field("email", StringField::new("Email").email())
//!     .build()
//!     .unwrap();
//!
//! let signup = FormDefinition::builder("signup")
//!     .extends(&contact)
//!     .field("age", IntegerField::new("Age").range(13, 120))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(signup.field_names().collect::<Vec<_>>(), ["name", "email", "age"]);
//! ```

use serde_json::{Map, Value};

use crate::builders::FieldSpec;
use crate::error::{DefinitionError, ValidationErrors};
use crate::field::Field;
use crate::schema::{self, ElicitationRequest, ElicitationSchema};
use crate::validation;
use crate::value::FormData;

/// An immutable, ordered set of named fields with its generated schema
#[derive(Debug, Clone)]
pub struct FormDefinition {
    name: String,
    message: Option<String>,
    fields: Vec<Field>,
    schema: ElicitationSchema,
}

impl FormDefinition {
    /// Start declaring a form
    pub fn builder(name: impl Into<String>) -> FormBuilder {
        FormBuilder::new(name)
    }

    /// Rebuild a definition from a flat elicitation object schema.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] for nested, combinator or unknown
    /// constructs and for anything [`Field::new`] rejects.
    pub fn from_schema(name: impl Into<String>, schema: &Value) -> Result<Self, DefinitionError> {
        schema::parse_object(schema)?
            .into_iter()
            .fold(FormBuilder::new(name), |builder, (field, spec)| {
                builder.field(field, spec)
            })
            .build()
    }

    /// Form name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default prompt message, if declared
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(Field::name)
    }

    /// The generated elicitation schema
    pub fn schema(&self) -> &ElicitationSchema {
        &self.schema
    }

    /// Names of fields that must be supplied (required and without default)
    pub fn required_fields(&self) -> &[String] {
        self.schema.required_names()
    }

    /// Build the request sent through the transport
    pub fn request(&self, message: impl Into<String>) -> ElicitationRequest {
        ElicitationRequest {
            message: message.into(),
            requested_schema: self.schema.clone(),
        }
    }

    /// Run the validation pipeline on raw content.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] with one entry per failing field.
    pub fn validate(&self, content: &Map<String, Value>) -> Result<FormData, ValidationErrors> {
        validation::validate(&self.fields, content)
    }

    /// A copy of this definition with one field's declaration replaced.
    ///
    /// The field keeps its position; name and message are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnknownField`] if the form has no such
    /// field, or any error the new declaration fails with.
    pub fn with_field_override(
        &self,
        name: &str,
        spec: impl Into<FieldSpec>,
    ) -> Result<Self, DefinitionError> {
        if self.field(name).is_none() {
            return Err(DefinitionError::UnknownField {
                form: self.name.clone(),
                field: name.to_string(),
            });
        }
        FormBuilder::new(self.name.clone())
            .extends(self)
            .field(name, spec)
            .build()
    }
}

struct Slot {
    name: String,
    spec: FieldSpec,
    inherited: bool,
}

/// Builder for [`FormDefinition`]
#[derive(Default)]
pub struct FormBuilder {
    name: String,
    message: Option<String>,
    slots: Vec<Slot>,
    error: Option<DefinitionError>,
}

impl std::fmt::Debug for FormBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormBuilder")
            .field("name", &self.name)
            .field("fields", &self.slots.iter().map(|s| &s.name).collect::<Vec<_>>())
            .finish()
    }
}

impl FormBuilder {
    /// Create a builder for a named form
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Inherit every field of `parent`, in the parent's order.
    ///
    /// A field declared later under the same name replaces the inherited one
    /// in place. The parent's message is used unless one is already set.
    pub fn extends(mut self, parent: &FormDefinition) -> Self {
        for field in parent.fields() {
            match self.slots.iter_mut().find(|s| s.name == field.name()) {
                Some(slot) if slot.inherited => slot.spec = field.spec().clone(),
                Some(_) => {}
                None => self.slots.push(Slot {
                    name: field.name().to_string(),
                    spec: field.spec().clone(),
                    inherited: true,
                }),
            }
        }
        if self.message.is_none() {
            self.message = parent.message().map(str::to_string);
        }
        self
    }

    /// Declare a field
    pub fn field(mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) -> Self {
        let name = name.into();
        let spec = spec.into();
        match self.slots.iter_mut().find(|s| s.name == name) {
            Some(slot) if slot.inherited => {
                slot.spec = spec;
                slot.inherited = false;
            }
            Some(_) => {
                self.error.get_or_insert(DefinitionError::DuplicateField(name));
            }
            None => self.slots.push(Slot {
                name,
                spec,
                inherited: false,
            }),
        }
        self
    }

    /// Set the default prompt message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Check every field and generate the schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] found, in declaration order.
    pub fn build(self) -> Result<FormDefinition, DefinitionError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let fields = self
            .slots
            .into_iter()
            .map(|slot| Field::new(slot.name, slot.spec))
            .collect::<Result<Vec<_>, _>>()?;
        let schema = schema::generate(&fields)?;

        Ok(FormDefinition {
            name: self.name,
            message: self.message,
            fields,
            schema,
        })
    }
}
