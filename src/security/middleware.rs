use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{info, instrument, warn};

use crate::shared::{AppError, AppState};

/// Bearer authentication middleware - resolves the Authorization header to a CurrentUser.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), security::require_auth))
/// Handlers can then extract Extension(current_user): Extension<CurrentUser>.
#[instrument(skip(state, req, next))]
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        warn!(uri = %req.uri(), "Missing or non-Bearer Authorization header");
        AppError::Unauthorized("Not authenticated".to_string())
    })?;

    // Log the real reason server-side; the client only ever sees the generic error
    let current_user = match state.auth_service.authenticate(&token).await {
        Ok(current_user) => current_user,
        Err(e) => {
            warn!(error = %e, "Bearer authentication failed");
            return Err(e.into());
        }
    };

    info!(user_id = current_user.id(), "Authentication successful");

    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Extracts the credentials from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
