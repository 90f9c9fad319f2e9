//! A three-step project onboarding wizard
//!
//! Step one asks what kind of project to create; the server then branches to
//! a service or a library form, and a service always ends on a review step.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use turbomcp_forms::{
    BooleanField, BoxError, DefinitionError, EnumField, Form, FormData, FormDefinition,
    IntegerField, StringField,
};

/// Accumulated wizard data, read back through serde
#[derive(Debug, Deserialize)]
pub(crate) struct ProjectPlan {
    pub(crate) name: String,
    pub(crate) kind: String,
    pub(crate) port: Option<i64>,
    pub(crate) tls: Option<bool>,
    pub(crate) license: Option<String>,
    pub(crate) contact: Option<String>,
}

fn project_definition() -> Result<FormDefinition, DefinitionError> {
    FormDefinition::builder("project")
        .message("Let's set up a new project")
        .field(
            "name",
            StringField::new("Project name")
                .description("Lowercase letters, digits and dashes")
                .pattern("^[a-z][a-z0-9-]*$")
                .max_length(40),
        )
        .field(
            "kind",
            EnumField::new("Project kind")
                .option("service", "Network service")
                .option("library", "Library crate")
                .match_labels(true),
        )
        .build()
}

fn service_definition() -> Result<FormDefinition, DefinitionError> {
    FormDefinition::builder("service")
        .message("Service settings")
        .field("port", IntegerField::new("Port").range(1024, 65535).default(8080))
        .field("tls", BooleanField::new("Enable TLS").default(false))
        .build()
}

fn library_definition() -> Result<FormDefinition, DefinitionError> {
    FormDefinition::builder("library")
        .message("Library settings")
        .field(
            "license",
            EnumField::new("License")
                .options(&["mit", "apache-2.0", "mpl-2.0"])
                .default("mit"),
        )
        .build()
}

fn review_definition() -> Result<FormDefinition, DefinitionError> {
    FormDefinition::builder("review")
        .message("Who should be paged when it breaks?")
        .field("contact", StringField::new("On-call email").email().optional())
        .build()
}

struct Definitions {
    project: Arc<FormDefinition>,
    service: Arc<FormDefinition>,
    library: Arc<FormDefinition>,
    review: Arc<FormDefinition>,
}

static DEFINITIONS: LazyLock<Result<Definitions, DefinitionError>> = LazyLock::new(|| {
    Ok(Definitions {
        project: Arc::new(project_definition()?),
        service: Arc::new(service_definition()?),
        library: Arc::new(library_definition()?),
        review: Arc::new(review_definition()?),
    })
});

fn definitions() -> Result<&'static Definitions, DefinitionError> {
    DEFINITIONS.as_ref().map_err(Clone::clone)
}

/// The first step; fails only if a form definition is inconsistent
pub(crate) fn first_step() -> Result<Arc<dyn Form>, DefinitionError> {
    Ok(Arc::new(ProjectForm {
        definition: Arc::clone(&definitions()?.project),
    }))
}

/// The project form, exposed for completion wiring
pub(crate) fn project_form() -> Result<Arc<FormDefinition>, DefinitionError> {
    Ok(Arc::clone(&definitions()?.project))
}

struct ProjectForm {
    definition: Arc<FormDefinition>,
}

#[async_trait]
impl Form for ProjectForm {
    fn definition(&self) -> Arc<FormDefinition> {
        Arc::clone(&self.definition)
    }

    async fn on_declined(&self) -> Result<Option<Value>, BoxError> {
        Ok(Some(json!({"status": "skipped"})))
    }

    fn next_form(&self, data: &FormData) -> Option<Arc<dyn Form>> {
        let defs = definitions().ok()?;
        match data.get_str("kind").ok()? {
            "service" => Some(Arc::new(ServiceForm {
                definition: Arc::clone(&defs.service),
            })),
            _ => Some(Arc::new(LibraryForm {
                definition: Arc::clone(&defs.library),
            })),
        }
    }
}

struct ServiceForm {
    definition: Arc<FormDefinition>,
}

#[async_trait]
impl Form for ServiceForm {
    fn definition(&self) -> Arc<FormDefinition> {
        Arc::clone(&self.definition)
    }

    async fn on_accepted(&self, data: &FormData) -> Result<Option<Value>, BoxError> {
        let port: i64 = data.get("port")?;
        let tls: bool = data.get("tls")?;
        info!(port, tls, "Service settings accepted");
        Ok(Some(json!({"listen": format!("0.0.0.0:{port}"), "tls": tls})))
    }

    fn next_form(&self, _data: &FormData) -> Option<Arc<dyn Form>> {
        let defs = definitions().ok()?;
        Some(Arc::new(ReviewForm {
            definition: Arc::clone(&defs.review),
        }))
    }
}

struct LibraryForm {
    definition: Arc<FormDefinition>,
}

#[async_trait]
impl Form for LibraryForm {
    fn definition(&self) -> Arc<FormDefinition> {
        Arc::clone(&self.definition)
    }
}

struct ReviewForm {
    definition: Arc<FormDefinition>,
}

#[async_trait]
impl Form for ReviewForm {
    fn definition(&self) -> Arc<FormDefinition> {
        Arc::clone(&self.definition)
    }

    fn message(&self) -> Option<String> {
        Some("Almost done. Who should be paged when it breaks?".to_string())
    }
}
