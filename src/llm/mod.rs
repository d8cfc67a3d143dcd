//! LLM client abstraction
//!
//! Minimal chat-completion surface used by the resolver and the definer:
//! plain completions for prompt-based strategies and tool-calling
//! completions for models trained on function calling.

pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod openai;

pub use traits::{CompletionClient, ToolCompletionClient};
pub use types::{Choice, Message, Role, ToolCall};

#[cfg(feature = "openai")]
pub use openai::OpenAiClient;
