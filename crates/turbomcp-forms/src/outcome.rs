//! Elicitation outcome handler.
//!
//! A [`FormInstance`] is one elicitation occurrence. It moves from
//! [`FormState::Unsent`] to [`FormState::Pending`] when sent, then to exactly
//! one terminal state. The raw reply is classified into an
//! [`ElicitationOutcome`]:
//!
//! | reply                                 | outcome                         |
//! |---------------------------------------|---------------------------------|
//! | `accept` with valid content           | `Accepted(data)`                |
//! | `accept` with invalid content         | `Err(FormError::Validation)`    |
//! | `accept` failing [`Form::clean`]      | `Err(FormError::Validation)`    |
//! | `decline`                             | `Declined`                      |
//! | `cancel`                              | `Cancelled(Client)`             |
//! | unknown tag, missing or non-object content | `Cancelled(Malformed)`     |
//! | timeout / signal / closed transport   | `Cancelled(Timeout / Signal / Disconnected)` |
//! | client lacks elicitation support      | `Err(FormError::NotSupported)`  |
//!
//! After classification the matching hook of the [`Form`] runs once. A hook
//! that returns a value makes that value the call's result.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::ElicitationConfig;
use crate::builders::FieldSpec;
use crate::error::{
    BoxError, DefinitionError, FieldError, FormError, FormResult, ValidationErrors,
};
use crate::form::FormDefinition;
use crate::session::{ElicitationSession, RoundTrip};
use crate::transport::{ElicitationReply, ReplyAction};
use crate::value::FormData;

/// Why an elicitation resolved to cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelReason {
    /// The client replied with `cancel`
    Client,
    /// No reply arrived before the timeout
    Timeout,
    /// The session's cancellation token fired
    Signal,
    /// The transport closed while waiting
    Disconnected,
    /// The reply was malformed or carried an unknown action
    Malformed,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Client => "client",
            Self::Timeout => "timeout",
            Self::Signal => "signal",
            Self::Disconnected => "disconnected",
            Self::Malformed => "malformed",
        };
        f.write_str(text)
    }
}

/// Terminal classification of one elicitation.
///
/// Only `Accepted` carries data.
#[derive(Debug, Clone, PartialEq)]
pub enum ElicitationOutcome {
    /// The user submitted valid data
    Accepted(FormData),
    /// The user explicitly declined
    Declined,
    /// The elicitation was dismissed, timed out, or could not be understood
    Cancelled(CancelReason),
}

impl ElicitationOutcome {
    /// Check if the user accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Check if the user declined
    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Declined)
    }

    /// Check if the elicitation was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Validated data, if accepted
    pub fn data(&self) -> Option<&FormData> {
        match self {
            Self::Accepted(data) => Some(data),
            _ => None,
        }
    }

    /// Take the validated data, if accepted
    pub fn into_data(self) -> Option<FormData> {
        match self {
            Self::Accepted(data) => Some(data),
            _ => None,
        }
    }

    /// Action tag (`accept`, `decline`, `cancel`)
    pub fn action(&self) -> &'static str {
        match self {
            Self::Accepted(_) => "accept",
            Self::Declined => "decline",
            Self::Cancelled(_) => "cancel",
        }
    }

    /// JSON shape returned to callers when no hook produced a value
    pub fn to_json(&self) -> Value {
        match self {
            Self::Accepted(data) => json!({"action": "accept", "content": data.to_json()}),
            Self::Declined => json!({"action": "decline"}),
            Self::Cancelled(reason) => json!({"action": "cancel", "reason": reason}),
        }
    }
}

/// Lifecycle state of a [`FormInstance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormState {
    /// Not sent yet
    Unsent,
    /// Waiting for the reply
    Pending,
    /// Accepted with valid data
    Accepted,
    /// Declined
    Declined,
    /// Cancelled
    Cancelled,
    /// Failed locally (validation, hook, or capability error)
    Failed,
}

impl FormState {
    /// Whether the instance can no longer change state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unsent | Self::Pending)
    }
}

/// What one elicitation produced: the outcome and the hook's value, if any
#[derive(Debug, Clone, PartialEq)]
pub struct FormResponse {
    /// The classified outcome
    pub outcome: ElicitationOutcome,
    /// Value returned by the matching hook
    pub reply: Option<Value>,
}

impl FormResponse {
    /// The hook's value if it returned one, otherwise the outcome as JSON
    pub fn into_result(self) -> Value {
        match self.reply {
            Some(reply) => reply,
            None => self.outcome.to_json(),
        }
    }
}

/// A form type: its definition, lifecycle hooks and branching.
///
/// Every hook defaults to returning `Ok(None)`, which leaves the raw outcome
/// as the call's result.
#[async_trait]
pub trait Form: Send + Sync {
    /// The immutable field table of this form
    fn definition(&self) -> Arc<FormDefinition>;

    /// Prompt message; falls back to the definition's, then the config's
    fn message(&self) -> Option<String> {
        None
    }

    /// Cross-field checks on data that passed every field pipeline.
    ///
    /// A failure is reported under [`NON_FIELD_ERRORS`](crate::NON_FIELD_ERRORS)
    /// and no hook runs.
    fn clean(&self, _data: &FormData) -> Result<(), FieldError> {
        Ok(())
    }

    /// Called once with the validated data after an accept
    async fn on_accepted(&self, _data: &FormData) -> Result<Option<Value>, BoxError> {
        Ok(None)
    }

    /// Called once after a decline
    async fn on_declined(&self) -> Result<Option<Value>, BoxError> {
        Ok(None)
    }

    /// Called once after a cancellation
    async fn on_cancelled(&self) -> Result<Option<Value>, BoxError> {
        Ok(None)
    }

    /// The next wizard step, chosen from this step's own validated data.
    /// `None` ends the wizard.
    fn next_form(&self, _data: &FormData) -> Option<Arc<dyn Form>> {
        None
    }
}

/// A form with no hooks and no next step
#[derive(Debug, Clone)]
pub struct PlainForm {
    definition: Arc<FormDefinition>,
}

impl PlainForm {
    /// Wrap a definition
    pub fn new(definition: impl Into<Arc<FormDefinition>>) -> Self {
        Self {
            definition: definition.into(),
        }
    }
}

#[async_trait]
impl Form for PlainForm {
    fn definition(&self) -> Arc<FormDefinition> {
        Arc::clone(&self.definition)
    }
}

/// One elicitation occurrence of a form.
///
/// Instances are single-use: after any terminal state a second
/// [`elicit`](FormInstance::elicit) returns [`FormError::AlreadyElicited`].
pub struct FormInstance {
    id: Uuid,
    form: Arc<dyn Form>,
    definition: Arc<FormDefinition>,
    message: Option<String>,
    timeout: Option<Duration>,
    state: FormState,
    data: Option<FormData>,
}

impl fmt::Debug for FormInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormInstance")
            .field("id", &self.id)
            .field("form", &self.definition.name())
            .field("state", &self.state)
            .finish()
    }
}

impl FormInstance {
    /// Create an unsent instance
    pub fn new(form: Arc<dyn Form>) -> Self {
        let definition = form.definition();
        Self {
            id: Uuid::new_v4(),
            form,
            definition,
            message: None,
            timeout: None,
            state: FormState::Unsent,
            data: None,
        }
    }

    /// Override the prompt message for this instance
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Override the session timeout for this instance
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace one field's declaration for this instance only.
    ///
    /// The form's shared definition is untouched; field order is kept.
    ///
    /// # Errors
    ///
    /// [`DefinitionError::UnknownField`] if the form has no such field, or any
    /// error the rebuilt definition raises.
    pub fn with_field(
        mut self,
        name: &str,
        spec: impl Into<FieldSpec>,
    ) -> Result<Self, DefinitionError> {
        self.definition = Arc::new(self.definition.with_field_override(name, spec)?);
        Ok(self)
    }

    /// Unique instance id, also recorded on the tracing span
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> FormState {
        self.state
    }

    /// Validated data, once accepted
    pub fn data(&self) -> Option<&FormData> {
        self.data.as_ref()
    }

    /// The form definition
    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    /// The form this instance was created from
    pub fn form(&self) -> &Arc<dyn Form> {
        &self.form
    }

    /// Send the form, classify the reply and run the matching hook.
    ///
    /// # Errors
    ///
    /// - [`FormError::AlreadyElicited`] if this instance already ran
    /// - [`FormError::NotSupported`] if the client cannot do elicitation
    /// - [`FormError::Validation`] if accepted content failed validation
    /// - [`FormError::Hook`] if the matching hook failed
    #[instrument(skip_all, fields(form = %self.definition.name(), instance = %self.id))]
    pub async fn elicit(&mut self, session: &ElicitationSession) -> FormResult<FormResponse> {
        if self.state != FormState::Unsent {
            return Err(FormError::AlreadyElicited);
        }

        let request = self.definition.request(self.resolve_message(session.config()));
        let timeout = self.timeout.unwrap_or(session.config().timeout);
        self.state = FormState::Pending;
        debug!(
            fields = self.definition.fields().len(),
            timeout_secs = timeout.as_secs(),
            "Sending elicitation request"
        );

        let outcome = match session.round_trip(&request, timeout).await {
            RoundTrip::NotSupported(reason) => {
                self.state = FormState::Failed;
                warn!(%reason, "Client does not support elicitation");
                return Err(FormError::NotSupported(reason));
            }
            RoundTrip::Cancelled(reason) => ElicitationOutcome::Cancelled(reason),
            RoundTrip::Reply(reply) => match self.classify(reply) {
                Ok(outcome) => outcome,
                Err(errors) => {
                    self.state = FormState::Failed;
                    warn!(errors = errors.len(), "Submitted form failed validation");
                    return Err(FormError::Validation(errors));
                }
            },
        };

        self.finish(outcome).await
    }

    fn resolve_message(&self, config: &ElicitationConfig) -> String {
        self.message
            .clone()
            .or_else(|| self.form.message())
            .or_else(|| self.definition.message().map(str::to_string))
            .unwrap_or_else(|| config.default_message.clone())
    }

    fn classify(&self, reply: ElicitationReply) -> Result<ElicitationOutcome, ValidationErrors> {
        match reply.action {
            ReplyAction::Accept => match reply.content {
                None => {
                    warn!("Accepted reply carried no content");
                    Ok(ElicitationOutcome::Cancelled(CancelReason::Malformed))
                }
                Some(Value::Object(content)) => {
                    let data = self.definition.validate(&content)?;
                    self.form.clean(&data).map_err(ValidationErrors::single)?;
                    Ok(ElicitationOutcome::Accepted(data))
                }
                Some(_) => {
                    warn!("Accepted reply carried non-object content");
                    Ok(ElicitationOutcome::Cancelled(CancelReason::Malformed))
                }
            },
            ReplyAction::Decline => Ok(ElicitationOutcome::Declined),
            ReplyAction::Cancel => Ok(ElicitationOutcome::Cancelled(CancelReason::Client)),
            ReplyAction::Unknown => {
                warn!("Reply carried an unknown action");
                Ok(ElicitationOutcome::Cancelled(CancelReason::Malformed))
            }
        }
    }

    async fn finish(&mut self, outcome: ElicitationOutcome) -> FormResult<FormResponse> {
        let hook = match &outcome {
            ElicitationOutcome::Accepted(data) => self.form.on_accepted(data).await,
            ElicitationOutcome::Declined => self.form.on_declined().await,
            ElicitationOutcome::Cancelled(_) => self.form.on_cancelled().await,
        };

        let reply = match hook {
            Ok(reply) => reply,
            Err(e) => {
                self.state = FormState::Failed;
                error!(error = %e, action = outcome.action(), "Form hook failed");
                return Err(FormError::Hook(e));
            }
        };

        self.state = match &outcome {
            ElicitationOutcome::Accepted(data) => {
                self.data = Some(data.clone());
                FormState::Accepted
            }
            ElicitationOutcome::Declined => FormState::Declined,
            ElicitationOutcome::Cancelled(_) => FormState::Cancelled,
        };
        info!(action = outcome.action(), has_reply = reply.is_some(), "Elicitation resolved");

        Ok(FormResponse { outcome, reply })
    }
}
