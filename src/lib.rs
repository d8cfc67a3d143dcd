//! nlcall - natural-language function calling
//!
//! nlcall turns free-form user input into calls of ordinary Rust functions.
//! A function is registered once with its signature and a definition (name,
//! description, parameter schema). At run time a resolver, usually a
//! language model, picks a function and supplies its parameters; nlcall
//! coerces and validates them against the signature and hands back a
//! [`Thunk`](function::Thunk) that only needs the slots the program chose to
//! supply itself (sessions, handles, request context).
//!
//! Modules:
//!
//! - **`function`** - values, signatures, descriptors, and the binder
//! - **`registry`** - thread-safe function registry
//! - **`resolver`** - input to call resolution (prompt or tool calling)
//! - **`definer`** - definitions from a model or from doc comments
//! - **`llm`** - completion client traits and an OpenAI-compatible client
//! - **`cache`** - on-disk definition cache
//! - **`agent`** - everything above wired together
//! - **`config`** - TOML configuration and `.env` loading
//! - **`observability`** - markdown session log
//!
//! # Features
//!
//! ```toml
//! [dependencies]
//! nlcall = { version = "0.1", default-features = false }
//! # Or pick what you need:
//! nlcall = { version = "0.1", default-features = false, features = ["openai"] }
//! ```
//!
//! # Example: binding without a model
//!
//! ```
//! use nlcall::function::{Definition, Function, NativeFn, Params, Signature, SlotType, Value};
//! use serde_json::json;
//!
//! let native = NativeFn::new(
//!     "greet",
//!     Signature::new().param(SlotType::Str).param(SlotType::Int),
//!     |args| Ok(vec![Value::from(format!("Hello, {}! You are {} years old.", args.str(0)?, args.int(1)?))]),
//! );
//! let def = Definition::new("greet", "Greet a person", json!({
//!     "type": "object",
//!     "properties": {"name": {"type": "string"}, "age": {"type": "integer"}}
//! }));
//! let greet = Function::new(native, def, []).unwrap();
//!
//! let thunk = greet.bind(&Params::raw(["\"Ann\"", "30"])).unwrap();
//! let out = thunk.invoke(vec![]).unwrap();
//! assert_eq!(out[0].as_str(), Some("Hello, Ann! You are 30 years old."));
//! ```

#![warn(missing_docs)]

pub mod agent;
pub mod cache;
pub mod definer;
pub mod function;
pub mod llm;
pub mod registry;
pub mod resolver;

/// Configuration management (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

/// Observability utilities (enabled with the `observability` feature)
#[cfg(feature = "observability")]
pub mod observability;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::agent::{Agent, AgentError, AgentResult, RegisterOptions};
    pub use crate::definer::{Definer, DocDefiner, LlmDefiner};
    pub use crate::function::{
        Args, Call, Definition, Function, FunctionError, NativeFn, Params, Signature, SlotType,
        Thunk, Value,
    };
    pub use crate::llm::{CompletionClient, ToolCompletionClient};
    pub use crate::registry::FunctionRegistry;
    pub use crate::resolver::{LlmResolver, Resolver};
    pub use crate::source_site;

    #[cfg(feature = "openai")]
    pub use crate::llm::OpenAiClient;

    #[cfg(feature = "config")]
    pub use crate::config::{Configuration, ConfigurationLoader, EnvironmentLoader};

    #[cfg(feature = "observability")]
    pub use crate::observability::Logger;
}
