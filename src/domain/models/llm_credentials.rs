use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which hosted LLM answers the prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    Groq,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Groq => "groq",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OpenAI",
            LlmProvider::Groq => "Groq",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn key_variable(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::Groq => "GROQ_API_KEY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" | "gpt" => Some(LlmProvider::OpenAi),
            "groq" => Some(LlmProvider::Groq),
            _ => None,
        }
    }

    pub fn all() -> [LlmProvider; 2] {
        [LlmProvider::OpenAi, LlmProvider::Groq]
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An explicit provider choice together with its API key.
#[derive(Clone, PartialEq, Eq)]
pub struct LlmCredentials {
    provider: LlmProvider,
    api_key: String,
}

impl LlmCredentials {
    pub fn new(provider: LlmProvider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
        }
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Resolve credentials from the environment once, at configuration time.
    ///
    /// With an explicit `preferred` provider only that provider's key is read.
    /// Otherwise `GROQ_API_KEY` takes precedence over `OPENAI_API_KEY`.
    /// Returns `None` when no usable key is set.
    pub fn from_env(preferred: Option<LlmProvider>) -> Option<Self> {
        Self::resolve(preferred, |name| std::env::var(name).ok())
    }

    /// Every provider key set in the environment, read once so later
    /// lookups never touch the process environment again.
    pub fn all_from_env() -> Vec<Self> {
        Self::collect(|name| std::env::var(name).ok())
    }

    pub(crate) fn collect(lookup: impl Fn(&str) -> Option<String>) -> Vec<Self> {
        LlmProvider::all()
            .into_iter()
            .filter_map(|provider| Self::read(provider, &lookup))
            .collect()
    }

    fn read(provider: LlmProvider, lookup: &impl Fn(&str) -> Option<String>) -> Option<Self> {
        lookup(provider.key_variable())
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(provider, key))
    }

    pub(crate) fn resolve(
        preferred: Option<LlmProvider>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<Self> {
        let read = |provider: LlmProvider| Self::read(provider, &lookup);

        match preferred {
            Some(provider) => {
                let credentials = read(provider);
                if credentials.is_none() {
                    warn!(
                        "LLM provider '{}' selected but {} is not set",
                        provider,
                        provider.key_variable()
                    );
                }
                credentials
            }
            None => read(LlmProvider::Groq).or_else(|| read(LlmProvider::OpenAi)),
        }
    }
}

impl std::fmt::Debug for LlmCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmCredentials")
            .field("provider", &self.provider)
            .field("api_key", &"***")
            .finish()
    }
}
