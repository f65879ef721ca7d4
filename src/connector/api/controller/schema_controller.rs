use anyhow::Result;

use crate::domain::ConnectionConfig;

use super::super::Container;

pub struct SchemaController<'a> {
    container: &'a Container,
}

impl<'a> SchemaController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn schema(&self) -> Result<String> {
        let database = self
            .container
            .connector()
            .connect(&ConnectionConfig::from_env())
            .await?;

        let schema = database.schema_info().await?;
        if schema.is_empty() {
            return Ok("No tables found.".to_string());
        }
        Ok(schema)
    }
}
