use std::sync::Arc;
use std::time::Duration;

use crate::application::{ChatClient, ChatClientFactory};
use crate::domain::{DomainError, LlmCredentials, LlmProvider};

use super::{GroqClient, OpenAiClient, GROQ_BASE_URL, GROQ_DEFAULT_MODEL, OPENAI_BASE_URL, OPENAI_DEFAULT_MODEL};

/// Default upper bound for a single completion request.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Model and endpoint settings for both providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub openai_model: String,
    pub openai_base_url: String,
    pub groq_model: String,
    pub groq_base_url: String,
    pub timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            openai_model: OPENAI_DEFAULT_MODEL.to_string(),
            openai_base_url: OPENAI_BASE_URL.to_string(),
            groq_model: GROQ_DEFAULT_MODEL.to_string(),
            groq_base_url: GROQ_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

impl LlmSettings {
    /// Construct from environment variables with hosted defaults:
    ///
    /// | Variable          | Default                            |
    /// |-------------------|------------------------------------|
    /// | `OPENAI_MODEL`    | `gpt-4`                            |
    /// | `OPENAI_BASE_URL` | `https://api.openai.com/v1`        |
    /// | `GROQ_MODEL`      | `mixtral-8x7b-32768`               |
    /// | `GROQ_BASE_URL`   | `https://api.groq.com/openai/v1`   |
    pub fn from_env(timeout: Duration) -> Self {
        let defaults = Self::default();
        let var = |name: &str, default: String| std::env::var(name).unwrap_or(default);
        Self {
            openai_model: var("OPENAI_MODEL", defaults.openai_model),
            openai_base_url: var("OPENAI_BASE_URL", defaults.openai_base_url),
            groq_model: var("GROQ_MODEL", defaults.groq_model),
            groq_base_url: var("GROQ_BASE_URL", defaults.groq_base_url),
            timeout,
        }
    }
}

/// Builds the hosted [`ChatClient`] matching a provider choice.
pub struct HttpChatClientFactory {
    settings: LlmSettings,
}

impl HttpChatClientFactory {
    pub fn new(settings: LlmSettings) -> Self {
        Self { settings }
    }
}

impl ChatClientFactory for HttpChatClientFactory {
    fn create(&self, credentials: &LlmCredentials) -> Result<Arc<dyn ChatClient>, DomainError> {
        if !credentials.has_key() {
            return Err(DomainError::missing_credential(format!(
                "no API key provided for {}",
                credentials.provider().display_name()
            )));
        }

        let settings = &self.settings;
        let client: Arc<dyn ChatClient> = match credentials.provider() {
            LlmProvider::OpenAi => Arc::new(OpenAiClient::new(
                credentials.api_key(),
                settings.openai_model.as_str(),
                settings.openai_base_url.as_str(),
                settings.timeout,
            )),
            LlmProvider::Groq => Arc::new(GroqClient::new(
                credentials.api_key(),
                settings.groq_model.as_str(),
                settings.groq_base_url.as_str(),
                settings.timeout,
            )),
        };
        Ok(client)
    }
}
