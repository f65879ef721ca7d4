use std::time::Duration;

use async_trait::async_trait;

use crate::application::ChatClient;
use crate::domain::DomainError;

use super::chat_completions::ChatCompletions;

/// Groq serves an OpenAI-compatible API under this prefix.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_DEFAULT_MODEL: &str = "mixtral-8x7b-32768";

/// HTTP client for Groq's hosted models.
pub struct GroqClient {
    inner: ChatCompletions,
}

impl GroqClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: ChatCompletions::new("groq", api_key, model, base_url, timeout),
        }
    }
}

#[async_trait]
impl ChatClient for GroqClient {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.inner.complete(prompt).await
    }

    fn name(&self) -> &str {
        "groq"
    }
}
