use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::{ChatClient, DatabaseAccessor};
use crate::domain::{DomainError, QueryResult};

use super::{GenerateSqlUseCase, PostProcess, PromptSet, PromptTemplate};

/// The outcome of one answered question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub sql: String,
    pub text: String,
    /// True when the answer was produced by the count shortcut instead of a
    /// second LLM call.
    pub shortcut: bool,
}

/// Question → SQL → rows → natural-language answer.
pub struct AnswerQuestionUseCase {
    sql_use_case: GenerateSqlUseCase,
    database: Arc<dyn DatabaseAccessor>,
    chat_client: Arc<dyn ChatClient>,
    template: PromptTemplate,
    post_process: PostProcess,
}

impl AnswerQuestionUseCase {
    pub fn new(
        database: Arc<dyn DatabaseAccessor>,
        chat_client: Arc<dyn ChatClient>,
        prompts: PromptSet,
    ) -> Self {
        Self {
            sql_use_case: GenerateSqlUseCase::new(
                database.clone(),
                chat_client.clone(),
                prompts.sql,
            ),
            database,
            chat_client,
            template: prompts.answer,
            post_process: prompts.post_process,
        }
    }

    pub async fn execute(&self, chat_history: &str, question: &str) -> Result<Answer, DomainError> {
        info!("Answering question: {}", question);
        let start_time = Instant::now();

        let schema = self.database.schema_info().await?;
        let sql = self
            .sql_use_case
            .generate_with_schema(&schema, chat_history, question)
            .await?;

        let result = self.database.execute(&sql).await.map_err(|e| {
            warn!("Generated SQL failed to execute: {}", e);
            e
        })?;
        debug!("Query returned {} rows", result.row_count());

        if let Some(text) = self.shortcut(&sql, &result) {
            info!("Answered by count shortcut: {}", text);
            return Ok(Answer {
                sql,
                text,
                shortcut: true,
            });
        }

        let response = result.to_string();
        let prompt = self.template.fill(&[
            ("schema", schema.as_str()),
            ("chat_history", chat_history),
            ("query", sql.as_str()),
            ("question", question),
            ("response", response.as_str()),
        ])?;
        debug!("Answer prompt ({} chars):\n{}", prompt.len(), prompt);

        let text = self.chat_client.complete(&prompt).await?.trim().to_string();

        info!(
            "Answered in {:.2}s using {}",
            start_time.elapsed().as_secs_f64(),
            self.chat_client.name()
        );

        Ok(Answer {
            sql,
            text,
            shortcut: false,
        })
    }

    fn shortcut(&self, sql: &str, result: &QueryResult) -> Option<String> {
        match self.post_process {
            PostProcess::None => None,
            PostProcess::CountShortcut => count_sentence(sql, result),
        }
    }
}

/// `"There were {n} decisions."` for a COUNT query with a scalar result.
pub fn count_sentence(sql: &str, result: &QueryResult) -> Option<String> {
    if !sql.to_uppercase().contains("COUNT") {
        return None;
    }
    let count = result.first_scalar().filter(|v| !v.is_null())?;
    Some(format!("There were {} decisions.", count.to_plain()))
}
