//! Completion providers
//!
//! A provider turns a partially typed argument value into a list of
//! suggestions. Three ready-made providers cover the common cases:
//!
//! - [`StaticCompletion`]: a fixed list, filtered by case-insensitive prefix
//! - [`FnCompletion`]: a synchronous closure that may look at resolved arguments
//! - [`FieldCompletion`]: the options of an enum (or boolean) form field

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use turbomcp_forms::{EnumOption, Field, FieldKind};

use crate::error::BoxError;

/// Context passed alongside the partial value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionContext {
    /// Previously resolved arguments of the same prompt or resource template
    #[serde(default)]
    pub arguments: HashMap<String, String>,
}

impl CompletionContext {
    /// Context carrying the given resolved arguments
    pub fn with_arguments<K, V>(arguments: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            arguments: arguments
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// A resolved argument by name
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).map(String::as_str)
    }
}

/// Produces suggestions for one argument
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Suggestions for `partial`, best first. The registry applies the cap.
    async fn complete(
        &self,
        partial: &str,
        context: &CompletionContext,
    ) -> Result<Vec<String>, BoxError>;
}

fn starts_with_ignore_case(candidate: &str, prefix: &str) -> bool {
    candidate.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Fixed suggestion list filtered by case-insensitive prefix
#[derive(Debug, Clone, Default)]
pub struct StaticCompletion {
    values: Vec<String>,
}

impl StaticCompletion {
    /// Provider over the given values, in order
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// All candidate values
    pub fn values(&self) -> &[String] {
        &self.values
    }

    fn matching(&self, partial: &str) -> Vec<String> {
        if partial.is_empty() {
            return self.values.clone();
        }
        self.values
            .iter()
            .filter(|v| starts_with_ignore_case(v, partial))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CompletionProvider for StaticCompletion {
    async fn complete(
        &self,
        partial: &str,
        _context: &CompletionContext,
    ) -> Result<Vec<String>, BoxError> {
        Ok(self.matching(partial))
    }
}

type CompletionFn = dyn Fn(&str, &CompletionContext) -> Vec<String> + Send + Sync;

/// Provider backed by a closure
pub struct FnCompletion {
    func: Box<CompletionFn>,
}

impl FnCompletion {
    /// Wrap a closure receiving the partial value and the context
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&str, &CompletionContext) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }
}

impl fmt::Debug for FnCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCompletion").finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionProvider for FnCompletion {
    async fn complete(
        &self,
        partial: &str,
        context: &CompletionContext,
    ) -> Result<Vec<String>, BoxError> {
        Ok((self.func)(partial, context))
    }
}

/// Suggests the options of a form field
///
/// Enum fields offer their option values; a partial matches on either the
/// value or the label. Boolean fields offer `true` and `false`. Other kinds
/// offer nothing.
#[derive(Debug, Clone)]
pub struct FieldCompletion {
    options: Vec<EnumOption>,
}

impl FieldCompletion {
    /// Provider for the given field
    pub fn new(field: &Field) -> Self {
        let options = match field.kind() {
            FieldKind::Enum => field.options().to_vec(),
            FieldKind::Boolean => vec![
                EnumOption::from_value("true"),
                EnumOption::from_value("false"),
            ],
            _ => Vec::new(),
        };
        Self { options }
    }

    /// Number of candidate options
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the field offers no options
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[async_trait]
impl CompletionProvider for FieldCompletion {
    async fn complete(
        &self,
        partial: &str,
        _context: &CompletionContext,
    ) -> Result<Vec<String>, BoxError> {
        Ok(self
            .options
            .iter()
            .filter(|opt| {
                partial.is_empty()
                    || starts_with_ignore_case(&opt.value, partial)
                    || starts_with_ignore_case(&opt.label, partial)
            })
            .map(|opt| opt.value.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbomcp_forms::{EnumField, StringField};

    #[tokio::test]
    async fn test_static_prefix_is_case_insensitive() {
        let provider = StaticCompletion::new(["Python", "pytest", "Rust"]);
        let ctx = CompletionContext::default();

        let values = provider.complete("PY", &ctx).await.unwrap();
        assert_eq!(values, vec!["Python", "pytest"]);

        let values = provider.complete("", &ctx).await.unwrap();
        assert_eq!(values.len(), 3);

        let values = provider.complete("go", &ctx).await.unwrap();
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_fn_completion_sees_context() {
        let provider = FnCompletion::new(|partial, ctx| {
            let owner = ctx.argument("owner").unwrap_or("anon");
            vec![format!("{owner}/{partial}")]
        });
        let ctx = CompletionContext::with_arguments([("owner", "epistates")]);

        let values = provider.complete("turbo", &ctx).await.unwrap();
        assert_eq!(values, vec!["epistates/turbo"]);
    }

    #[tokio::test]
    async fn test_field_completion_matches_value_or_label() {
        let field = Field::new(
            "status",
            EnumField::new("Status")
                .option("wip", "Work in progress")
                .option("done", "Finished"),
        )
        .unwrap();
        let provider = FieldCompletion::new(&field);
        let ctx = CompletionContext::default();

        assert_eq!(provider.complete("w", &ctx).await.unwrap(), vec!["wip"]);
        assert_eq!(provider.complete("fin", &ctx).await.unwrap(), vec!["done"]);
        assert_eq!(provider.complete("", &ctx).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_field_completion_for_other_kinds() {
        let flag = Field::new("flag", turbomcp_forms::BooleanField::new("Flag")).unwrap();
        let provider = FieldCompletion::new(&flag);
        let ctx = CompletionContext::default();
        assert_eq!(provider.complete("T", &ctx).await.unwrap(), vec!["true"]);

        let text = Field::new("text", StringField::new("Text")).unwrap();
        assert!(FieldCompletion::new(&text).is_empty());
    }
}
