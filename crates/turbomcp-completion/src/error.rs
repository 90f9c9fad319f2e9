//! Completion error types

use thiserror::Error;

use crate::registry::ComponentKey;

/// Boxed error returned by provider implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias for completion operations
pub type CompletionResult<T> = Result<T, CompletionError>;

/// Errors raised by the completion registry
#[derive(Debug, Error)]
pub enum CompletionError {
    /// A provider is already registered for this component argument
    #[error("Completion provider already registered for {key} argument '{argument}'")]
    AlreadyRegistered {
        /// Component the provider belongs to
        key: ComponentKey,
        /// Argument name
        argument: String,
    },

    /// No provider is registered for this component argument
    #[error("No completion provider for {key} argument '{argument}'")]
    NotFound {
        /// Component that was queried
        key: ComponentKey,
        /// Argument name
        argument: String,
    },

    /// The provider itself failed
    #[error("Completion provider failed: {0}")]
    Provider(#[source] BoxError),
}

impl CompletionError {
    /// Whether the lookup failed because nothing was registered
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
