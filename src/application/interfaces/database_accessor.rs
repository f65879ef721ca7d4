use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ConnectionConfig, DomainError, QueryResult};

/// Read access to the connected court decisions database.
#[async_trait]
pub trait DatabaseAccessor: Send + Sync {
    /// Table names, columns, types and a few sample rows, as prompt text.
    ///
    /// Not cached: callers get a fresh introspection on every call.
    async fn schema_info(&self) -> Result<String, DomainError>;

    /// Run `sql` exactly as given.
    ///
    /// There is no validation, sanitization or parameterization. The text
    /// comes from an LLM completion, so a destructive statement emitted by
    /// the model would be executed as-is.
    async fn execute(&self, sql: &str) -> Result<QueryResult, DomainError>;
}

/// Opens a [`DatabaseAccessor`] from user-supplied connection parameters.
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Arc<dyn DatabaseAccessor>, DomainError>;
}
