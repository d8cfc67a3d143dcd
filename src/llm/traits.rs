//! Completion client traits.

use anyhow::Result;

use super::types::{Choice, Message};
use crate::function::Definition;

/// Chat-completion backend.
///
/// Implementations return every candidate the model produced; callers use
/// the first one. Dropping the returned future cancels the request.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete a conversation.
    async fn complete(&self, messages: &[Message]) -> Result<Vec<Choice>>;
}

/// Completion backend with native tool calling.
#[async_trait::async_trait]
pub trait ToolCompletionClient: CompletionClient {
    /// Complete a conversation offering `tools` to the model.
    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[Definition],
    ) -> Result<Vec<Choice>>;
}
