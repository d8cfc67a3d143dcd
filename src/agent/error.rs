//! Error types for the agent.

use thiserror::Error;

use crate::function::FunctionError;
use crate::registry::RegistryError;

/// Errors surfaced by [`Agent`](super::Agent) operations.
///
/// Resolver, definer, cache, and client failures pass through unchanged as
/// [`AgentError::Other`] so callers can downcast to the original type.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The user input was empty.
    #[error("empty user input")]
    EmptyInput,

    /// The resolver chose a function that is not registered.
    #[error("function {name} does not exist")]
    NotFound {
        /// Requested function name.
        name: String,
    },

    /// Registration was refused by the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The resolver already holds a function with this name.
    #[error("failed to add function {name} to resolver")]
    ResolverRejected {
        /// Function name.
        name: String,
    },

    /// Descriptor construction or binding failed.
    #[error(transparent)]
    Function(#[from] FunctionError),

    /// A collaborator failed.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AgentError {
    /// Create a NotFound error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a ResolverRejected error.
    pub fn resolver_rejected(name: impl Into<String>) -> Self {
        Self::ResolverRejected { name: name.into() }
    }
}

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
