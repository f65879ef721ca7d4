mod connection_config;
mod conversation;
mod llm_credentials;
mod pipeline_profile;
mod query_result;

pub use connection_config::*;
pub use conversation::*;
pub use llm_credentials::*;
pub use pipeline_profile::*;
pub use query_result::*;
