//! In-process stand-ins for MySQL and the LLM providers.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dusturia_chat::{
    ChatClient, ChatClientFactory, ChatSession, ConnectionConfig, DatabaseAccessor,
    DatabaseConnector, DomainError, LlmCredentials, PipelineProfile, PromptSet, QueryResult,
};

pub const SCHEMA: &str = "CREATE TABLE `decisions` (\n  `year` int,\n  `summary` text\n)";

/// What the fake model does on its next call.
pub enum Scripted {
    Reply(&'static str),
    Reject,
    Fail,
}

/// Replays scripted completions in order and records every prompt.
pub struct ScriptedChatClient {
    script: Mutex<VecDeque<Scripted>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedChatClient {
    pub fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn replies(replies: &[&'static str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| Scripted::Reply(*r)).collect())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(text)) => Ok(text.to_string()),
            Some(Scripted::Reject) => Err(DomainError::invalid_credential("401 Unauthorized")),
            Some(Scripted::Fail) | None => Err(DomainError::provider("503 Service Unavailable")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Hands out the same scripted client for any credentials.
pub struct FakeChatFactory {
    client: Arc<ScriptedChatClient>,
    created: AtomicUsize,
}

impl FakeChatFactory {
    pub fn new(client: Arc<ScriptedChatClient>) -> Arc<Self> {
        Arc::new(Self {
            client,
            created: AtomicUsize::new(0),
        })
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ChatClientFactory for FakeChatFactory {
    fn create(&self, _credentials: &LlmCredentials) -> Result<Arc<dyn ChatClient>, DomainError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(self.client.clone())
    }
}

/// A database that returns a fixed schema and a fixed result for any query,
/// or an execution error when `result` is `None`.
pub struct FakeDatabase {
    result: Option<QueryResult>,
    schema_unreadable: bool,
    executed: Mutex<Vec<String>>,
    schema_calls: AtomicUsize,
}

impl FakeDatabase {
    pub fn returning(result: QueryResult) -> Arc<Self> {
        Arc::new(Self {
            result: Some(result),
            schema_unreadable: false,
            executed: Mutex::new(Vec::new()),
            schema_calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: None,
            schema_unreadable: false,
            executed: Mutex::new(Vec::new()),
            schema_calls: AtomicUsize::new(0),
        })
    }

    /// Drops the connection while the schema is being read.
    pub fn schema_unreadable() -> Arc<Self> {
        Arc::new(Self {
            result: None,
            schema_unreadable: true,
            executed: Mutex::new(Vec::new()),
            schema_calls: AtomicUsize::new(0),
        })
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn schema_calls(&self) -> usize {
        self.schema_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseAccessor for FakeDatabase {
    async fn schema_info(&self) -> Result<String, DomainError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        if self.schema_unreadable {
            return Err(DomainError::connection(
                "Failed to list tables: 2013 (HY000): Lost connection to MySQL server",
            ));
        }
        Ok(SCHEMA.to_string())
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult, DomainError> {
        self.executed.lock().unwrap().push(sql.to_string());
        match &self.result {
            Some(result) => Ok(result.clone()),
            None => Err(DomainError::execution(
                "1054 (42S22): Unknown column 'yeer' in 'where clause'",
            )),
        }
    }
}

/// Validates the config like the real connector, then hands out `database`.
pub struct FakeConnector {
    database: Arc<FakeDatabase>,
    connects: AtomicUsize,
}

impl FakeConnector {
    pub fn new(database: Arc<FakeDatabase>) -> Arc<Self> {
        Arc::new(Self {
            database,
            connects: AtomicUsize::new(0),
        })
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseConnector for FakeConnector {
    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Arc<dyn DatabaseAccessor>, DomainError> {
        config.validate()?;
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.database.clone())
    }
}

pub fn local_config() -> ConnectionConfig {
    ConnectionConfig::new("localhost", "3306", "root", "secret", "dusturia")
}

pub fn credentials() -> Option<LlmCredentials> {
    Some(LlmCredentials::new(Default::default(), "sk-test"))
}

pub struct Harness {
    pub session: ChatSession,
    pub client: Arc<ScriptedChatClient>,
    pub factory: Arc<FakeChatFactory>,
    pub database: Arc<FakeDatabase>,
    pub connector: Arc<FakeConnector>,
}

pub fn harness(
    profile: PipelineProfile,
    database: Arc<FakeDatabase>,
    client: Arc<ScriptedChatClient>,
) -> Harness {
    let connector = FakeConnector::new(database.clone());
    let factory = FakeChatFactory::new(client.clone());
    let session = ChatSession::new(
        connector.clone(),
        factory.clone(),
        PromptSet::for_profile(profile),
    );
    Harness {
        session,
        client,
        factory,
        database,
        connector,
    }
}
