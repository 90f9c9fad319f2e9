//! # TurboMCP Completion
//!
//! Argument completion for prompts and resource templates.
//!
//! A [`CompletionRegistry`] maps `(component, argument)` pairs to
//! [`CompletionProvider`]s. Lookups are lock-free reads; registration of a
//! given key is single-writer. Results are capped (100 by default) and report
//! whether more suggestions were available.
//!
//! ```rust
//! use std::sync::Arc;
//! use turbomcp_completion::{
//!     CompletionContext, CompletionRegistry, ComponentKey, StaticCompletion,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = CompletionRegistry::new();
//! registry.register(
//!     ComponentKey::prompt("deploy"),
//!     "region",
//!     Arc::new(StaticCompletion::new(["us-east-1", "us-west-2", "eu-west-1"])),
//! )?;
//!
//! let response = registry
//!     .complete(&ComponentKey::prompt("deploy"), "region", "us", &CompletionContext::default())
//!     .await?;
//! assert_eq!(response.values, vec!["us-east-1", "us-west-2"]);
//! assert!(!response.has_more);
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

pub mod error;
pub mod provider;
pub mod registry;

pub use error::{BoxError, CompletionError, CompletionResult};
pub use provider::{
    CompletionContext, CompletionProvider, FieldCompletion, FnCompletion, StaticCompletion,
};
pub use registry::{
    CompletionConfig, CompletionRegistry, CompletionResponse, ComponentKey, MAX_COMPLETION_RESULTS,
};
