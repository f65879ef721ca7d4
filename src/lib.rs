pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::Commands;

pub use application::{
    count_sentence, clean_sql, select_chat_client, Answer, AnswerQuestionUseCase, ChatClient,
    ChatClientFactory, ChatSession, DatabaseAccessor, DatabaseConnector, GenerateSqlUseCase,
    Notice, NoticeLevel, PostProcess, PromptSet, PromptTemplate, Reply, CREDENTIAL_REPLY,
    NO_RESPONSE,
};

pub use connector::{
    GroqClient, HttpChatClientFactory, LlmSettings, MySqlConnector, MySqlDatabase, OpenAiClient,
};

pub use connector::api::{Container, ContainerConfig, Router};

pub use domain::{
    ChatMessage, ConnectionConfig, Conversation, DomainError, LlmCredentials, LlmProvider,
    PipelineProfile, QueryResult, Role, SqlValue, GREETING,
};
