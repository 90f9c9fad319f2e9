//! Process-wide completion registry
//!
//! Providers are keyed by the component they belong to (a prompt or a
//! resource template) and the argument name. Component keys are taken as
//! given; any prefixing done when servers are mounted together happens
//! before registration.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{CompletionError, CompletionResult};
use crate::provider::{CompletionContext, CompletionProvider};

/// Hard upper bound on suggestions in one response
pub const MAX_COMPLETION_RESULTS: usize = 100;

/// Component an argument belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ComponentKey {
    /// A prompt, by name
    #[serde(rename = "ref/prompt")]
    Prompt {
        /// Prompt name
        name: String,
    },
    /// A resource template, by URI template
    #[serde(rename = "ref/resource")]
    Resource {
        /// URI or URI template
        uri: String,
    },
}

impl ComponentKey {
    /// Key for a prompt
    pub fn prompt(name: impl Into<String>) -> Self {
        Self::Prompt { name: name.into() }
    }

    /// Key for a resource template
    pub fn resource(uri: impl Into<String>) -> Self {
        Self::Resource { uri: uri.into() }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt { name } => write!(f, "prompt '{name}'"),
            Self::Resource { uri } => write!(f, "resource '{uri}'"),
        }
    }
}

/// Registry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Maximum suggestions per response, clamped to [`MAX_COMPLETION_RESULTS`]
    pub max_results: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_COMPLETION_RESULTS,
        }
    }
}

impl CompletionConfig {
    fn cap(&self) -> usize {
        self.max_results.min(MAX_COMPLETION_RESULTS)
    }
}

/// Suggestions for one completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Suggestions, at most the configured cap
    pub values: Vec<String>,
    /// Number of suggestions the provider produced before truncation
    pub total: usize,
    /// Whether suggestions were dropped by the cap
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

impl CompletionResponse {
    /// Truncate `values` to `cap`, recording the original total
    pub fn truncated(mut values: Vec<String>, cap: usize) -> Self {
        let total = values.len();
        let has_more = total > cap;
        values.truncate(cap);
        Self {
            values,
            total,
            has_more,
        }
    }

    /// An empty response
    pub fn empty() -> Self {
        Self {
            values: Vec::new(),
            total: 0,
            has_more: false,
        }
    }
}

type ProviderKey = (ComponentKey, String);

/// Concurrent map from `(component, argument)` to provider
pub struct CompletionRegistry {
    providers: DashMap<ProviderKey, Arc<dyn CompletionProvider>>,
    config: CompletionConfig,
}

impl CompletionRegistry {
    /// Empty registry with the default cap
    pub fn new() -> Self {
        Self::with_config(CompletionConfig::default())
    }

    /// Empty registry with the given configuration
    pub fn with_config(config: CompletionConfig) -> Self {
        Self {
            providers: DashMap::new(),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Register a provider for one argument of a component
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::AlreadyRegistered`] if the pair already has
    /// a provider; the existing one is kept.
    pub fn register(
        &self,
        key: ComponentKey,
        argument: impl Into<String>,
        provider: Arc<dyn CompletionProvider>,
    ) -> CompletionResult<()> {
        let argument = argument.into();
        match self.providers.entry((key, argument)) {
            Entry::Occupied(entry) => {
                let (key, argument) = entry.key().clone();
                Err(CompletionError::AlreadyRegistered { key, argument })
            }
            Entry::Vacant(entry) => {
                debug!(component = %entry.key().0, argument = %entry.key().1, "Registered completion provider");
                entry.insert(provider);
                Ok(())
            }
        }
    }

    /// Remove a provider, returning it if one was registered
    pub fn unregister(
        &self,
        key: &ComponentKey,
        argument: &str,
    ) -> Option<Arc<dyn CompletionProvider>> {
        self.providers
            .remove(&(key.clone(), argument.to_string()))
            .map(|(_, provider)| provider)
    }

    /// The provider for a component argument
    pub fn get(&self, key: &ComponentKey, argument: &str) -> Option<Arc<dyn CompletionProvider>> {
        self.providers
            .get(&(key.clone(), argument.to_string()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Whether a provider exists for a component argument
    pub fn contains(&self, key: &ComponentKey, argument: &str) -> bool {
        self.providers
            .contains_key(&(key.clone(), argument.to_string()))
    }

    /// Arguments with a registered provider for the given component
    pub fn arguments(&self, key: &ComponentKey) -> Vec<String> {
        let mut args: Vec<String> = self
            .providers
            .iter()
            .filter(|entry| &entry.key().0 == key)
            .map(|entry| entry.key().1.clone())
            .collect();
        args.sort();
        args
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Run the provider for a component argument and cap its output
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::NotFound`] when nothing is registered for
    /// the pair, or [`CompletionError::Provider`] when the provider fails.
    pub async fn complete(
        &self,
        key: &ComponentKey,
        argument: &str,
        partial: &str,
        context: &CompletionContext,
    ) -> CompletionResult<CompletionResponse> {
        // Clone out of the map so no shard lock is held across the await
        let provider = self
            .get(key, argument)
            .ok_or_else(|| CompletionError::NotFound {
                key: key.clone(),
                argument: argument.to_string(),
            })?;

        let values = provider
            .complete(partial, context)
            .await
            .map_err(CompletionError::Provider)?;

        let response = CompletionResponse::truncated(values, self.config.cap());
        trace!(
            component = %key,
            argument,
            total = response.total,
            has_more = response.has_more,
            "Completed argument"
        );
        Ok(response)
    }
}

impl Default for CompletionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompletionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRegistry")
            .field("providers", &self.providers.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticCompletion;
    use serde_json::json;

    #[test]
    fn test_component_key_wire_shape() {
        let key = ComponentKey::prompt("greet");
        assert_eq!(
            serde_json::to_value(&key).unwrap(),
            json!({"type": "ref/prompt", "name": "greet"})
        );

        let key: ComponentKey =
            serde_json::from_value(json!({"type": "ref/resource", "uri": "file:///{path}"}))
                .unwrap();
        assert_eq!(key, ComponentKey::resource("file:///{path}"));
        assert_eq!(key.to_string(), "resource 'file:///{path}'");
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let registry = CompletionRegistry::new();
        let key = ComponentKey::prompt("greet");
        registry
            .register(key.clone(), "name", Arc::new(StaticCompletion::new(["a"])))
            .unwrap();

        let err = registry
            .register(key.clone(), "name", Arc::new(StaticCompletion::new(["b"])))
            .unwrap_err();
        assert!(matches!(err, CompletionError::AlreadyRegistered { .. }));
        assert_eq!(registry.len(), 1);

        // Same argument on another component is a different key
        registry
            .register(ComponentKey::prompt("other"), "name", Arc::new(StaticCompletion::default()))
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.arguments(&key), vec!["name"]);
    }

    #[test]
    fn test_response_truncation() {
        let values: Vec<String> = (0..150).map(|i| format!("v{i}")).collect();
        let response = CompletionResponse::truncated(values, MAX_COMPLETION_RESULTS);
        assert_eq!(response.values.len(), 100);
        assert_eq!(response.total, 150);
        assert!(response.has_more);
        assert_eq!(response.values[0], "v0");

        let response = CompletionResponse::truncated(vec!["x".into()], 100);
        assert!(!response.has_more);

        let json = serde_json::to_value(CompletionResponse::empty()).unwrap();
        assert_eq!(json, json!({"values": [], "total": 0, "hasMore": false}));
    }

    #[test]
    fn test_config_cap_is_clamped() {
        let config = CompletionConfig { max_results: 500 };
        assert_eq!(config.cap(), MAX_COMPLETION_RESULTS);
        let config = CompletionConfig { max_results: 5 };
        assert_eq!(config.cap(), 5);
    }
}
