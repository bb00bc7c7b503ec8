//! LLM Provider trait
//!
//! Abstracts the completion service so the conversation loop can run against
//! any chat backend, or a scripted one in tests.

use anyhow::Result;

use super::types::ChatMessage;

/// Trait for chat completion backends
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the full ordered history and return the assistant's reply text
    ///
    /// A reply with no choices or no content is returned as an empty string;
    /// the caller decides what that means.
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String>;

    /// Get the provider name (e.g., "openai-compatible")
    fn provider_name(&self) -> &str;
}
