use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::application::{ChatClientFactory, ChatSession, DatabaseConnector, PromptSet};
use crate::connector::adapter::{
    HttpChatClientFactory, LlmSettings, MySqlConnector, DEFAULT_ACQUIRE_TIMEOUT_SECS,
    DEFAULT_LLM_TIMEOUT_SECS,
};
use crate::domain::{ConnectionConfig, LlmCredentials, LlmProvider, PipelineProfile};

pub struct ContainerConfig {
    pub profile: PipelineProfile,
    /// Explicit provider choice. When `None` the provider is inferred once from
    /// which API key is set, `GROQ_API_KEY` first.
    pub provider: Option<LlmProvider>,
    pub llm_timeout: Duration,
    pub db_acquire_timeout: Duration,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            profile: PipelineProfile::default(),
            provider: None,
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            db_acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

/// Composition root: owns the adapters every chat session is built from.
pub struct Container {
    connector: Arc<dyn DatabaseConnector>,
    chat_factory: Arc<dyn ChatClientFactory>,
    env_credentials: Option<LlmCredentials>,
    /// Key of every provider set in the environment at startup.
    env_keys: Vec<LlmCredentials>,
    form_defaults: ConnectionConfig,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Self {
        debug!("Initializing MySQL connector");
        let connector = Arc::new(MySqlConnector::new(config.db_acquire_timeout));

        let settings = LlmSettings::from_env(config.llm_timeout);
        debug!(
            "LLM models: openai={} groq={}",
            settings.openai_model, settings.groq_model
        );
        let chat_factory = Arc::new(HttpChatClientFactory::new(settings));

        let env_credentials = LlmCredentials::from_env(config.provider);
        let env_keys = LlmCredentials::all_from_env();
        match &env_credentials {
            Some(credentials) => info!(
                "LLM provider resolved from environment: {}",
                credentials.provider()
            ),
            None if config.profile.prompts_for_api_key() => {
                info!("No LLM key in environment; expecting one from the connect form")
            }
            None => info!("No LLM key in environment; questions will be refused"),
        }

        // Never pre-fill the password field.
        let mut form_defaults = ConnectionConfig::from_env();
        form_defaults.password.clear();

        Self {
            connector,
            chat_factory,
            env_credentials,
            env_keys,
            form_defaults,
            config,
        }
    }

    /// Build a container around caller-supplied adapters.
    pub fn with_components(
        config: ContainerConfig,
        connector: Arc<dyn DatabaseConnector>,
        chat_factory: Arc<dyn ChatClientFactory>,
        env_credentials: Option<LlmCredentials>,
    ) -> Self {
        Self {
            connector,
            chat_factory,
            env_keys: env_credentials.iter().cloned().collect(),
            env_credentials,
            form_defaults: ConnectionConfig {
                port: "3306".to_string(),
                ..ConnectionConfig::default()
            },
            config,
        }
    }

    pub fn new_session(&self) -> ChatSession {
        ChatSession::new(
            self.connector.clone(),
            self.chat_factory.clone(),
            self.prompts(),
        )
    }

    pub fn prompts(&self) -> PromptSet {
        PromptSet::for_profile(self.config.profile)
    }

    /// Credentials for a connect event.
    ///
    /// Profiles that prompt for a key prefer the one typed in the form and
    /// fall back to the environment key of the chosen provider; other
    /// profiles always use the key resolved at startup.
    pub fn credentials_for(&self, form: Option<LlmCredentials>) -> Option<LlmCredentials> {
        if !self.config.profile.prompts_for_api_key() {
            return self.env_credentials.clone();
        }

        match form {
            Some(credentials) if credentials.has_key() => Some(credentials),
            Some(credentials) => self.env_key(credentials.provider()),
            None => self.env_credentials.clone(),
        }
    }

    fn env_key(&self, provider: LlmProvider) -> Option<LlmCredentials> {
        self.env_keys
            .iter()
            .find(|credentials| credentials.provider() == provider)
            .cloned()
    }

    pub fn connector(&self) -> Arc<dyn DatabaseConnector> {
        self.connector.clone()
    }

    pub fn profile(&self) -> PipelineProfile {
        self.config.profile
    }

    pub fn env_provider(&self) -> Option<LlmProvider> {
        self.env_credentials.as_ref().map(|c| c.provider())
    }

    pub fn form_defaults(&self) -> &ConnectionConfig {
        &self.form_defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(profile: PipelineProfile, env_credentials: Option<LlmCredentials>) -> Container {
        Container::with_components(
            ContainerConfig {
                profile,
                ..ContainerConfig::default()
            },
            Arc::new(MySqlConnector::default()),
            Arc::new(HttpChatClientFactory::new(LlmSettings::default())),
            env_credentials,
        )
    }

    #[test]
    fn decisions_profile_ignores_form_credentials() {
        let env = LlmCredentials::new(LlmProvider::Groq, "gsk-env");
        let container = container(PipelineProfile::Decisions, Some(env));

        let chosen = container
            .credentials_for(Some(LlmCredentials::new(LlmProvider::OpenAi, "sk-form")))
            .unwrap();
        assert_eq!(chosen.provider(), LlmProvider::Groq);
        assert_eq!(chosen.api_key(), "gsk-env");
    }

    #[test]
    fn form_key_wins_for_dusturia() {
        let env = LlmCredentials::new(LlmProvider::Groq, "gsk-env");
        let container = container(PipelineProfile::Dusturia, Some(env));

        let chosen = container
            .credentials_for(Some(LlmCredentials::new(LlmProvider::OpenAi, "sk-form")))
            .unwrap();
        assert_eq!(chosen.api_key(), "sk-form");
    }

    #[test]
    fn blank_form_key_falls_back_to_startup_key_of_that_provider() {
        let env = LlmCredentials::new(LlmProvider::Groq, "gsk-env");
        let container = container(PipelineProfile::Dusturia, Some(env));

        let chosen = container
            .credentials_for(Some(LlmCredentials::new(LlmProvider::Groq, "")))
            .unwrap();
        assert_eq!(chosen.api_key(), "gsk-env");

        // No OpenAI key was resolved at startup, whatever the environment holds now.
        std::env::set_var("OPENAI_API_KEY", "sk-set-after-startup");
        let chosen =
            container.credentials_for(Some(LlmCredentials::new(LlmProvider::OpenAi, " ")));
        std::env::remove_var("OPENAI_API_KEY");
        assert!(chosen.is_none());
    }
}
