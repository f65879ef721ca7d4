use std::time::Duration;

use async_trait::async_trait;

use crate::application::ChatClient;
use crate::domain::DomainError;

use super::chat_completions::ChatCompletions;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4";

/// HTTP client for the OpenAI Chat Completions API.
///
/// Implements [`ChatClient`] so the pipelines stay decoupled from transport
/// and serialization details.
pub struct OpenAiClient {
    inner: ChatCompletions,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: ChatCompletions::new("openai", api_key, model, base_url, timeout),
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.inner.complete(prompt).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}
