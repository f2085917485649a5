// Public API - what other modules can use
pub use handlers::{create_todo, delete_todo, list_todos, patch_todo};
pub use models::TodoState;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
