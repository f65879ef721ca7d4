use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::application::{ChatClient, DatabaseAccessor};
use crate::domain::DomainError;

use super::PromptTemplate;

const CODE_FENCE: &str = "```";

/// Info strings recognised right after an opening fence.
const LANGUAGE_TAGS: [&str; 2] = ["mysql", "sql"];

/// Turns a question plus conversation history into a single SQL string.
pub struct GenerateSqlUseCase {
    database: Arc<dyn DatabaseAccessor>,
    chat_client: Arc<dyn ChatClient>,
    template: PromptTemplate,
}

impl GenerateSqlUseCase {
    pub fn new(
        database: Arc<dyn DatabaseAccessor>,
        chat_client: Arc<dyn ChatClient>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            database,
            chat_client,
            template,
        }
    }

    pub async fn execute(&self, chat_history: &str, question: &str) -> Result<String, DomainError> {
        let schema = self.database.schema_info().await?;
        self.generate_with_schema(&schema, chat_history, question).await
    }

    /// Same as [`Self::execute`] for a caller that already fetched the schema
    /// during the current request.
    pub async fn generate_with_schema(
        &self,
        schema: &str,
        chat_history: &str,
        question: &str,
    ) -> Result<String, DomainError> {
        let prompt = self.template.fill(&[
            ("schema", schema),
            ("chat_history", chat_history),
            ("question", question),
        ])?;
        debug!("SQL prompt ({} chars):\n{}", prompt.len(), prompt);

        let start_time = Instant::now();
        let raw = self.chat_client.complete(&prompt).await?;
        debug!("{} raw SQL completion: {}", self.chat_client.name(), raw);

        let sql = clean_sql(&raw);
        info!(
            "Generated SQL with {} in {:.2}s: {}",
            self.chat_client.name(),
            start_time.elapsed().as_secs_f64(),
            sql
        );

        if sql.is_empty() {
            return Err(DomainError::provider("model returned an empty SQL query"));
        }

        Ok(sql)
    }
}

/// Strip the wrapping a model sometimes adds around the query despite being
/// told not to: code fences, a language tag and a repeated `SQL Query:` label.
pub fn clean_sql(raw: &str) -> String {
    let mut sql = raw.trim();

    if let Some(rest) = sql.strip_prefix(CODE_FENCE) {
        sql = strip_language_tag(rest);
    }
    if let Some(rest) = sql.trim_end().strip_suffix(CODE_FENCE) {
        sql = rest;
    }

    let mut sql = sql.trim();
    if let Some(rest) = strip_prefix_ignore_case(sql, "SQL Query:") {
        sql = rest.trim_start();
    }

    sql.replace(CODE_FENCE, "").trim().to_string()
}

/// Drop a `sql` or `mysql` tag, whether it sits on its own line or is
/// followed by the query on the same line. Anything else is query text.
fn strip_language_tag(text: &str) -> &str {
    for tag in LANGUAGE_TAGS {
        if let Some(rest) = strip_prefix_ignore_case(text, tag) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest;
            }
        }
    }
    text
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}
