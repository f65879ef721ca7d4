use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{AskController, SchemaController};

pub struct Router<'a> {
    ask_controller: AskController<'a>,
    schema_controller: SchemaController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            ask_controller: AskController::new(container),
            schema_controller: SchemaController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Ask { question, show_sql } => self.ask_controller.ask(question, show_sql).await,
            Commands::Schema => self.schema_controller.schema().await,
            Commands::Serve { .. } => unreachable!("serve command is handled separately in main"),
        }
    }
}
