use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::security::{AuthError, AuthService, CredentialVerifier, PasswordError, TokenError, TokenService};
use crate::todo::repository::TodoRepository;
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub todo_repository: Arc<dyn TodoRepository + Send + Sync>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        todo_repository: Arc<dyn TodoRepository + Send + Sync>,
        token_service: Arc<TokenService>,
        credential_verifier: Arc<CredentialVerifier>,
    ) -> Self {
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&user_repository),
            token_service,
            credential_verifier,
        ));

        Self {
            user_repository,
            todo_repository,
            auth_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Any bearer-token failure; deliberately carries no detail
    #[error("Could not validate credentials")]
    Credentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Incorrect email or password")]
    IncorrectCredentials,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Lookup(msg) => AppError::DatabaseError(msg),
            AuthError::Token(_) | AuthError::MissingSubject | AuthError::UnknownSubject => {
                AppError::Credentials
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Encoding(msg) => {
                warn!(error = %msg, "Token issuance failed");
                AppError::Internal
            }
            TokenError::Malformed | TokenError::InvalidSignature | TokenError::Expired => {
                AppError::Credentials
            }
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(error: PasswordError) -> Self {
        warn!(error = %error, "Password hashing failed");
        AppError::Internal
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        let unique_violation = error
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == "23505");

        if unique_violation {
            AppError::Conflict("Username or Email already exists".to_string())
        } else {
            warn!(error = %error, "Database operation failed");
            AppError::DatabaseError(error.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Credentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::IncorrectCredentials | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "detail": self.to_string()
        }));

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }

        (status, body).into_response()
    }
}
