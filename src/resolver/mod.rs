//! Resolver Module
//!
//! A resolver maps free-form user input to a [`Call`]: the name of a
//! registered function plus its external parameters. Resolution is async;
//! dropping the returned future cancels it.

mod error;
mod llm;
mod parse;

pub use error::{ResolverError, ResolverResult};
pub use llm::{LlmResolver, DEFAULT_PROMPT_TEMPLATE};
pub use parse::parse_call_str;

use std::sync::Arc;

use crate::function::{Call, Function};

/// Maps user input to a function call.
#[async_trait::async_trait]
pub trait Resolver: Send + Sync {
    /// Make `function` available for resolution.
    ///
    /// Returns `false` if a function with the same name was already added.
    fn add_func(&self, function: Arc<Function>) -> bool;

    /// Resolve `input` to a call of one of the added functions.
    async fn resolve(&self, input: &str) -> anyhow::Result<Call>;
}
