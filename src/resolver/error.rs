//! Resolver error types.

use thiserror::Error;

/// Errors produced while turning model output into a call.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Output does not contain a `name(args)` call.
    #[error("invalid call string: {0}")]
    FuncStrParse(String),

    /// Argument list is not a valid JSON sequence.
    #[error("invalid parameters to parse: {0}")]
    InvalidParams(String),

    /// The model returned no choices.
    #[error("no choices returned")]
    NoChoices,

    /// The model returned no tool calls.
    #[error("no calls returned")]
    NoToolCalls,

    /// The model chose a function that was never added.
    #[error("function {0} not found")]
    UnknownFunction(String),

    /// Tool-call arguments are not a JSON object.
    #[error("invalid arguments for function {name}: {message}")]
    InvalidToolArguments {
        /// Function name.
        name: String,
        /// Decoder message.
        message: String,
    },
}

impl ResolverError {
    /// Create an invalid tool arguments error.
    pub fn invalid_tool_arguments(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidToolArguments {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type for resolver operations.
pub type ResolverResult<T> = Result<T, ResolverError>;
