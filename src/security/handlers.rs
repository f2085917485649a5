use axum::{extract::State, Extension, Form, Json};
use tracing::{info, instrument};

use super::types::{CurrentUser, LoginForm, TokenResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for the password login flow
///
/// POST /auth/token
/// Form fields `username` (the account email) and `password`
#[instrument(name = "login_for_token", skip(state, form))]
pub async fn login_for_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state
        .auth_service
        .login(&form.username, &form.password)
        .await?;

    Ok(Json(token))
}

/// HTTP handler for exchanging a still-valid token for a new one
///
/// POST /auth/refresh_token
#[instrument(name = "refresh_access_token", skip(state, current_user))]
pub async fn refresh_access_token(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.auth_service.refresh(&current_user)?;

    info!(user_id = current_user.id(), "Issued refreshed token");
    Ok(Json(token))
}
