// Library crate for the fast_zero todo API
// This file exposes the public API for the binary and integration tests

pub mod config;
pub mod routes;
pub mod security;
pub mod shared;
pub mod todo;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use config::{AppConfig, ConfigError, TokenSettings};
pub use routes::create_router;
pub use security::{AuthService, Clock, CredentialVerifier, CurrentUser, FixedClock, SystemClock, TokenService};
pub use shared::{AppError, AppState};
pub use todo::repository::{InMemoryTodoRepository, PostgresTodoRepository, TodoRepository};
pub use user::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
