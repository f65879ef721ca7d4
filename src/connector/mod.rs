//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - MySQL access through sqlx
//! - OpenAI and Groq chat completions over HTTP
//! - The CLI router and the browser chat surface

pub mod adapter;
pub mod api;
pub mod web;

pub use adapter::*;
