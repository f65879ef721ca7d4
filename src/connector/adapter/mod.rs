mod chat_client_factory;
mod chat_completions;
mod groq_client;
mod mysql_database;
mod openai_client;

pub use chat_client_factory::*;
pub use groq_client::*;
pub use mysql_database::*;
pub use openai_client::*;
