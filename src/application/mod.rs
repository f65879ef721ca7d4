//! # Application Layer
//!
//! Use cases and orchestration logic coordinating domain and connector layers.

pub mod interfaces;
pub mod session;
pub mod use_cases;

pub use interfaces::*;
pub use session::*;
pub use use_cases::*;
