mod chat_client;
mod database_accessor;

pub use chat_client::*;
pub use database_accessor::*;
