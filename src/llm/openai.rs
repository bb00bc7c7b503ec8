//! OpenAI-compatible chat completions client
//!
//! Talks to any endpoint implementing `POST {base_url}/chat/completions`
//! with bearer authentication.
//!
//! ```ignore
//! let llm = OpenAiProvider::new("sk-...")
//!     .with_base_url("https://dashscope.aliyuncs.com/compatible-mode/v1");
//! let reply = llm.complete("qwen3-max", &messages).await?;
//! ```

use anyhow::{Context, Result};
use reqwest::Client;

use super::provider::LlmProvider;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::Settings;

/// Default API base (DashScope compatible mode)
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

/// Chat completions provider
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    /// Create a provider with an API key and the default base URL
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a provider from resolved settings
    pub fn from_settings(settings: &Settings) -> Self {
        tracing::info!("[OpenAi] Using base URL: {}", settings.base_url);
        Self::new(settings.api_key.clone()).with_base_url(settings.base_url.clone())
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let url = self.endpoint();
        tracing::info!("[OpenAi] Sending {} messages to {}", messages.len(), model);

        let request = ChatCompletionRequest { model, messages };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to chat completions API")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read chat completions response body")?;

        tracing::debug!("[OpenAi] Response status: {}", status);
        tracing::debug!("[OpenAi] Response body: {}", response_text);

        if !status.is_success() {
            tracing::error!("[OpenAi] API error: {} - {}", status, response_text);
            anyhow::bail!("API error ({}): {}", status, response_text);
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&response_text)
            .context("Failed to parse chat completions response")?;

        if let Some(usage) = &parsed.usage {
            tracing::info!(
                "[OpenAi] Tokens: prompt={} completion={} total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        Ok(parsed.into_text())
    }

    fn provider_name(&self) -> &str {
        "openai-compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let provider = OpenAiProvider::new("key").with_base_url("http://localhost:8000/v1/");
        assert_eq!(provider.endpoint(), "http://localhost:8000/v1/chat/completions");

        let provider = OpenAiProvider::new("key");
        assert_eq!(
            provider.endpoint(),
            "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
        );
    }
}
