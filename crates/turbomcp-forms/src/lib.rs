//! # TurboMCP Forms
//!
//! Declarative elicitation forms for MCP servers: typed fields, a flat schema
//! generator, a collect-all validation pipeline, a three-outcome elicitation
//! handler and a multi-step wizard controller.
//!
//! ## Overview
//!
//! - **Fields** ([`StringField`], [`IntegerField`], [`NumberField`],
//!   [`BooleanField`], [`EnumField`]) declare what a value looks like.
//! - **Forms** ([`FormDefinition`]) collect named fields in order, support
//!   inheritance and generate the restricted JSON Schema sent to clients.
//! - **Validation** coerces the client's raw values and reports every failing
//!   field at once.
//! - **Elicitation** ([`FormInstance`]) sends a form through an
//!   [`ElicitationTransport`], classifies the reply as accepted, declined or
//!   cancelled, and runs the form's hooks.
//! - **Wizards** ([`Wizard`]) chain forms, with the server choosing each next
//!   step from the data just submitted.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use turbomcp_forms::{
//!     ElicitationSession, FormDefinition, FormInstance, IntegerField, PlainForm,
//!     ScriptedTransport, StringField,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let definition = FormDefinition::builder("project")
//!     .message("Configure your project")
//!     .field("name", StringField::new("Project name").min_length(1))
//!     .field("port", IntegerField::new("Port").range(1024, 65535).default(3000))
//!     .build()?;
//!
//! let transport = Arc::new(ScriptedTransport::new().then_accept(json!({"name": "demo"})));
//! let session = ElicitationSession::new(transport);
//!
//! let mut instance = FormInstance::new(Arc::new(PlainForm::new(definition)));
//! let response = instance.elicit(&session).await?;
//! let data = response.outcome.data().expect("accepted");
//! assert_eq!(data.get::<i64>("port")?, 3000);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_panics_doc
)]

pub mod builders;
pub mod config;
pub mod error;
pub mod field;
pub mod form;
pub mod outcome;
pub mod schema;
pub mod session;
pub mod transport;
pub mod validation;
pub mod value;
pub mod wizard;

pub use builders::{
    BooleanField, DeclaredConstraints, EnumField, EnumOption, FieldKind, FieldSpec, IntegerField,
    NumberField, StringField,
};
pub use config::{ConfigError, ConfigurationBuilder, ElicitationConfig};
pub use error::{
    BoxError, DefinitionError, FieldError, FieldErrorKind, FormError, FormResult, NON_FIELD_ERRORS,
    ValidationErrors,
};
pub use field::Field;
pub use form::{FormBuilder, FormDefinition};
pub use outcome::{
    CancelReason, ElicitationOutcome, Form, FormInstance, FormResponse, FormState, PlainForm,
};
pub use schema::{ElicitationRequest, ElicitationSchema, PrimitiveSchemaDefinition, StringFormat};
pub use session::ElicitationSession;
pub use transport::{
    ElicitationReply, ElicitationTransport, ReplyAction, ScriptStep, ScriptedTransport,
    TransportError,
};
pub use value::{DataError, FieldValue, FormData, FromFieldValue};
pub use wizard::{Wizard, WizardOutcome, WizardState};

/// Commonly used items
pub mod prelude {
    pub use crate::{
        BooleanField, CancelReason, ElicitationOutcome, ElicitationSession, EnumField, Form,
        FormData, FormDefinition, FormError, FormInstance, FormResult, IntegerField, NumberField,
        StringField, Wizard, WizardOutcome,
    };
}
