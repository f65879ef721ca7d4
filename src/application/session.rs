use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::application::{
    AnswerQuestionUseCase, ChatClient, ChatClientFactory, DatabaseAccessor, DatabaseConnector,
    PromptSet,
};
use crate::domain::{ChatMessage, ConnectionConfig, Conversation, DomainError, LlmCredentials};

/// Reply shown when no usable API key is configured or the provider rejects it.
pub const CREDENTIAL_REPLY: &str = "Unable to process request due to missing or invalid API key.";

/// AI placeholder appended when the pipeline fails after the question was recorded.
pub const NO_RESPONSE: &str = "No response";

/// Resolve a provider choice into a client, failing before any network I/O
/// when there is no key to send.
pub fn select_chat_client(
    factory: &dyn ChatClientFactory,
    credentials: Option<&LlmCredentials>,
) -> Result<Arc<dyn ChatClient>, DomainError> {
    match credentials {
        Some(credentials) if credentials.has_key() => factory.create(credentials),
        Some(credentials) => Err(DomainError::missing_credential(format!(
            "no API key provided for {}",
            credentials.provider().display_name()
        ))),
        None => Err(DomainError::missing_credential(
            "set OPENAI_API_KEY or GROQ_API_KEY",
        )),
    }
}

/// Outcome of resolving the LLM client at connect time.
enum LlmSelection {
    Ready(Arc<dyn ChatClient>),
    Unavailable(String),
}

/// The assistant's reply to one submitted question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    pub sql: Option<String>,
}

/// Kind of a one-shot notice shown above the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// State of one interactive chat session.
///
/// Owns the conversation, the database accessor and the LLM client; nothing is
/// shared between sessions. Callers serialize events on a session, so each
/// connect or submit runs to completion before the next.
pub struct ChatSession {
    connector: Arc<dyn DatabaseConnector>,
    chat_factory: Arc<dyn ChatClientFactory>,
    prompts: PromptSet,
    conversation: Conversation,
    database: Option<Arc<dyn DatabaseAccessor>>,
    llm: Option<LlmSelection>,
    connection_label: Option<String>,
    last_sql: Option<String>,
    notice: Option<Notice>,
}

impl ChatSession {
    pub fn new(
        connector: Arc<dyn DatabaseConnector>,
        chat_factory: Arc<dyn ChatClientFactory>,
        prompts: PromptSet,
    ) -> Self {
        Self {
            connector,
            chat_factory,
            prompts,
            conversation: Conversation::new(),
            database: None,
            llm: None,
            connection_label: None,
            last_sql: None,
            notice: None,
        }
    }

    /// Open the database and resolve the LLM client.
    ///
    /// A connection failure leaves any previous connection untouched. A
    /// missing API key does not fail the connect; it is reported on the next
    /// submit without contacting the provider.
    pub async fn connect(
        &mut self,
        config: &ConnectionConfig,
        credentials: Option<LlmCredentials>,
    ) -> Result<(), DomainError> {
        info!("Connecting to {}", config.url());

        let database = self.connector.connect(config).await.map_err(|e| {
            warn!("Failed to connect to {}: {}", config.url(), e);
            e
        })?;

        let llm = match select_chat_client(self.chat_factory.as_ref(), credentials.as_ref()) {
            Ok(client) => {
                info!("Using LLM provider {}", client.name());
                LlmSelection::Ready(client)
            }
            Err(e) => {
                warn!("No LLM client available: {}", e);
                LlmSelection::Unavailable(e.to_string())
            }
        };

        self.database = Some(database);
        self.llm = Some(llm);
        self.connection_label = Some(config.url());
        Ok(())
    }

    /// Record a question and answer it.
    ///
    /// On success the conversation grows by the question and the answer. When
    /// the generated SQL fails to execute only the question is recorded. Other
    /// pipeline failures record a placeholder reply and return the error.
    pub async fn submit(&mut self, question: &str) -> Result<Reply, DomainError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DomainError::invalid_input("question is empty"));
        }

        let (database, llm) = match (&self.database, &self.llm) {
            (Some(database), Some(llm)) => (database.clone(), llm),
            _ => return Err(DomainError::NotConnected),
        };

        let chat_client = match llm {
            LlmSelection::Ready(client) => client.clone(),
            LlmSelection::Unavailable(reason) => {
                warn!("Refusing to answer without an LLM client: {}", reason);
                self.conversation.push(ChatMessage::human(question));
                self.conversation.push(ChatMessage::ai(CREDENTIAL_REPLY));
                return Ok(Reply {
                    text: CREDENTIAL_REPLY.to_string(),
                    sql: None,
                });
            }
        };

        self.conversation.push(ChatMessage::human(question));
        let history = self.conversation.transcript();

        let use_case = AnswerQuestionUseCase::new(database, chat_client, self.prompts.clone());
        match use_case.execute(&history, question).await {
            Ok(answer) => {
                self.conversation.push(ChatMessage::ai(answer.text.clone()));
                self.last_sql = Some(answer.sql.clone());
                Ok(Reply {
                    text: answer.text,
                    sql: Some(answer.sql),
                })
            }
            Err(e) if e.is_execution_error() => Err(e),
            Err(e) if e.is_credential_error() => {
                self.conversation.push(ChatMessage::ai(CREDENTIAL_REPLY));
                Ok(Reply {
                    text: CREDENTIAL_REPLY.to_string(),
                    sql: None,
                })
            }
            Err(e) => {
                self.conversation.push(ChatMessage::ai(NO_RESPONSE));
                Err(e)
            }
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    pub fn is_connected(&self) -> bool {
        self.database.is_some() && self.llm.is_some()
    }

    pub fn connection_label(&self) -> Option<&str> {
        self.connection_label.as_deref()
    }

    pub fn last_sql(&self) -> Option<&str> {
        self.last_sql.as_deref()
    }

    pub fn set_notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            text: text.into(),
        });
    }

    /// Notices are shown once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}
