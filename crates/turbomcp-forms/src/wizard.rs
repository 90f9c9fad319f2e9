//! Wizard controller: a server-driven sequence of forms.
//!
//! Each step is a fresh [`FormInstance`]. An accepted step merges its data
//! into the accumulated record (later steps win on name collisions) and asks
//! the step's form for the next one. A declined or cancelled step terminates
//! the run. There is no way back to an earlier step.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::{DefinitionError, FormError, FormResult};
use crate::outcome::{ElicitationOutcome, Form, FormInstance};
use crate::session::ElicitationSession;
use crate::value::FormData;

/// Lifecycle state of a [`Wizard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardState {
    /// Not started
    Idle,
    /// Presenting step `step` (zero-based)
    Running {
        /// Current step index
        step: usize,
    },
    /// Every step accepted and the last one had no successor
    Completed,
    /// Step `step` was declined or cancelled
    Terminated {
        /// Index of the step that did not accept
        step: usize,
    },
    /// Step `step` failed with an error
    Failed {
        /// Index of the failing step
        step: usize,
    },
}

impl WizardState {
    /// Whether the run is over
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Idle | Self::Running { .. })
    }
}

/// Result of a wizard run that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum WizardOutcome {
    /// Every step was accepted
    Completed {
        /// Union of all steps' data, later steps winning
        data: FormData,
        /// Form names of the steps, in order
        steps: Vec<String>,
        /// Hook value of each step, in order
        replies: Vec<Option<Value>>,
    },
    /// A step was declined or cancelled
    Terminated {
        /// Index of that step
        step: usize,
        /// Its outcome (never `Accepted`)
        outcome: ElicitationOutcome,
        /// Value returned by its hook
        reply: Option<Value>,
    },
}

impl WizardOutcome {
    /// Check if every step was accepted
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Accumulated data, if completed
    pub fn data(&self) -> Option<&FormData> {
        match self {
            Self::Completed { data, .. } => Some(data),
            Self::Terminated { .. } => None,
        }
    }
}

/// Runs a chain of forms starting from a first form.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use turbomcp_forms::{ElicitationSession, Form, Wizard};
/// # async fn run(first: Arc<dyn Form>, session: ElicitationSession) -> turbomcp_forms::FormResult<()> {
/// let mut wizard = Wizard::new(first);
/// let outcome = wizard.run(&session).await?;
/// if let Some(data) = outcome.data() {
///     println!("collected {} fields", data.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Wizard {
    first: Arc<dyn Form>,
    state: WizardState,
}

impl std::fmt::Debug for Wizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wizard")
            .field("first", &self.first.definition().name())
            .field("state", &self.state)
            .finish()
    }
}

impl Wizard {
    /// Create an idle wizard
    pub fn new(first: Arc<dyn Form>) -> Self {
        Self {
            first,
            state: WizardState::Idle,
        }
    }

    /// Current state
    pub fn state(&self) -> WizardState {
        self.state
    }

    /// Run every step until completion, termination or failure.
    ///
    /// A wizard runs once; create a new one to start over.
    ///
    /// # Errors
    ///
    /// - [`FormError::AlreadyElicited`] if the wizard already ran
    /// - [`FormError::Definition`] with [`DefinitionError::WizardTooLong`]
    ///   when the chain exceeds `max_wizard_steps`
    /// - any error of [`FormInstance::elicit`] for the failing step
    #[instrument(skip_all, fields(wizard = %self.first.definition().name()))]
    pub async fn run(&mut self, session: &ElicitationSession) -> FormResult<WizardOutcome> {
        if self.state != WizardState::Idle {
            return Err(FormError::AlreadyElicited);
        }

        let max_steps = session.config().max_wizard_steps;
        let mut current = Arc::clone(&self.first);
        let mut data = FormData::new();
        let mut steps = Vec::new();
        let mut replies = Vec::new();
        let mut step = 0;

        loop {
            if step >= max_steps {
                self.state = WizardState::Failed { step };
                warn!(step, max_steps, "Wizard exceeded its step limit");
                return Err(DefinitionError::WizardTooLong(max_steps).into());
            }

            self.state = WizardState::Running { step };
            let mut instance = FormInstance::new(Arc::clone(&current));
            debug!(step, form = %instance.definition().name(), "Presenting wizard step");

            let response = match instance.elicit(session).await {
                Ok(response) => response,
                Err(e) => {
                    self.state = WizardState::Failed { step };
                    warn!(step, error = %e, "Wizard step failed");
                    return Err(e);
                }
            };
            steps.push(instance.definition().name().to_string());

            let step_data = match response.outcome {
                ElicitationOutcome::Accepted(step_data) => step_data,
                outcome => {
                    self.state = WizardState::Terminated { step };
                    info!(step, action = outcome.action(), "Wizard terminated");
                    return Ok(WizardOutcome::Terminated {
                        step,
                        outcome,
                        reply: response.reply,
                    });
                }
            };

            data.merge(&step_data);
            replies.push(response.reply);

            match current.next_form(&step_data) {
                Some(next) => {
                    current = next;
                    step += 1;
                }
                None => {
                    self.state = WizardState::Completed;
                    info!(steps = steps.len(), fields = data.len(), "Wizard completed");
                    return Ok(WizardOutcome::Completed {
                        data,
                        steps,
                        replies,
                    });
                }
            }
        }
    }
}
