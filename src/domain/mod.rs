//! # Domain Layer
//!
//! Core models of a chat session over the court decisions database.
//! This layer is independent of external frameworks and infrastructure.

mod error;
pub mod models;

pub use error::DomainError;
pub use models::*;
