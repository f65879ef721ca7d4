use anyhow::Result;

use crate::application::Reply;
use crate::domain::ConnectionConfig;

use super::super::Container;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(&self, question: String, show_sql: bool) -> Result<String> {
        let mut session = self.container.new_session();
        session
            .connect(
                &ConnectionConfig::from_env(),
                self.container.credentials_for(None),
            )
            .await?;

        let reply = session.submit(&question).await?;
        Ok(self.format_reply(&reply, show_sql))
    }

    fn format_reply(&self, reply: &Reply, show_sql: bool) -> String {
        match (&reply.sql, show_sql) {
            (Some(sql), true) => format!("SQL: {}\n\n{}", sql, reply.text),
            _ => reply.text.clone(),
        }
    }
}
