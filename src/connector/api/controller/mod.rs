pub mod ask_controller;
pub mod schema_controller;

pub use ask_controller::AskController;
pub use schema_controller::SchemaController;
