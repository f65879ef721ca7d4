use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Missing LLM credential: {0}")]
    MissingCredential(String),

    #[error("Invalid LLM credential: {0}")]
    InvalidCredential(String),

    #[error("Please connect to the database first.")]
    NotConnected,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn missing_credential(msg: impl Into<String>) -> Self {
        Self::MissingCredential(msg.into())
    }

    pub fn invalid_credential(msg: impl Into<String>) -> Self {
        Self::InvalidCredential(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// True for errors caused by an absent or rejected API key.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::MissingCredential(_) | Self::InvalidCredential(_))
    }
}
