// Public API - what other modules can use
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{AuthError, PasswordError, TokenError};
pub use handlers::{login_for_token, refresh_access_token};
pub use middleware::require_auth;
pub use password::CredentialVerifier;
pub use service::AuthService;
pub use token::TokenService;
pub use types::{CurrentUser, TokenClaims, TokenResponse};

// Internal modules
mod clock;
mod errors;
mod handlers;
mod middleware;
mod password;
mod service;
mod token;
mod types;
