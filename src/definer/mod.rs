//! Definer Module
//!
//! A definer produces the [`Definition`] (name, description, parameter
//! schema) of a native function so it can be offered to a resolver.
//! [`LlmDefiner`] asks a language model to write it from the function's
//! source; [`DocDefiner`] derives it locally from the doc comment and the
//! declared signature.

mod doc;
mod llm;

pub use doc::DocDefiner;
pub use llm::{LlmDefiner, DEFAULT_DEFINER_PROMPT};

use crate::function::{Definition, NativeFn};

/// Produces definitions for native functions.
#[async_trait::async_trait]
pub trait Definer: Send + Sync {
    /// Define `native`. Slots listed in `ignored` are supplied by the caller
    /// at invocation time and must not appear in the parameter schema.
    async fn define(&self, native: &NativeFn, ignored: &[usize]) -> anyhow::Result<Definition>;
}
