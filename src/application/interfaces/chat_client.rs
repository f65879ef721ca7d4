use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{DomainError, LlmCredentials};

/// An interface for sending a filled prompt to an LLM and receiving its text
/// completion.
///
/// Implementors encapsulate transport, serialization, and vendor-specific API
/// details. Failures surface as [`DomainError::Provider`] (or
/// [`DomainError::InvalidCredential`] when the key is rejected) and are never
/// retried.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;

    /// Provider name, for logging.
    fn name(&self) -> &str;
}

/// Builds a concrete [`ChatClient`] for a provider choice.
pub trait ChatClientFactory: Send + Sync {
    fn create(&self, credentials: &LlmCredentials) -> Result<Arc<dyn ChatClient>, DomainError>;
}
