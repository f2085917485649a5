use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    errors::AuthError,
    password::CredentialVerifier,
    token::TokenService,
    types::{CurrentUser, TokenResponse},
};
use crate::{shared::AppError, user::repository::UserRepository};

/// Ties password checks, token handling and the user store together
pub struct AuthService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    token_service: Arc<TokenService>,
    credential_verifier: Arc<CredentialVerifier>,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        token_service: Arc<TokenService>,
        credential_verifier: Arc<CredentialVerifier>,
    ) -> Self {
        Self {
            user_repository,
            token_service,
            credential_verifier,
        }
    }

    pub fn token_service(&self) -> &TokenService {
        &self.token_service
    }

    /// Hashes a password on the blocking pool
    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let verifier = Arc::clone(&self.credential_verifier);
        let credential = password.to_owned();

        let hash = tokio::task::spawn_blocking(move || verifier.hash(&credential))
            .await
            .map_err(|e| {
                warn!(error = %e, "Password hashing task failed");
                AppError::Internal
            })??;

        Ok(hash)
    }

    /// Checks email and password and issues a fresh access token
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, AppError> {
        info!("Login attempt");

        let user = match self.user_repository.find_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("Login rejected: unknown email");
                return Err(AppError::IncorrectCredentials);
            }
        };

        let verifier = Arc::clone(&self.credential_verifier);
        let candidate = password.to_owned();
        let stored_hash = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || verifier.verify(&candidate, &stored_hash))
            .await
            .map_err(|e| {
                warn!(error = %e, "Password verification task failed");
                AppError::Internal
            })?;

        if !matches {
            warn!(user_id = user.id, "Login rejected: password mismatch");
            return Err(AppError::IncorrectCredentials);
        }

        let access_token = self
            .token_service
            .issue_for_subject(&user.email, self.token_service.now())?;

        info!(user_id = user.id, "Login successful");
        Ok(TokenResponse::bearer(access_token))
    }

    /// Resolves a bearer token to a known user. Every failure here is shown
    /// to clients as the same credentials error.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self.token_service.decode(token)?;

        let subject = claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or(AuthError::MissingSubject)?;

        let user = self
            .user_repository
            .find_by_email(&subject)
            .await
            .map_err(|e| AuthError::Lookup(e.to_string()))?
            .ok_or(AuthError::UnknownSubject)?;

        Ok(CurrentUser::new(user))
    }

    /// Issues a brand-new token for an already authenticated user.
    /// The new expiry counts from now; the old token is left to expire on its own.
    #[instrument(skip(self, current), fields(user_id = current.id()))]
    pub fn refresh(&self, current: &CurrentUser) -> Result<TokenResponse, AppError> {
        let access_token = self
            .token_service
            .issue_for_subject(&current.user().email, self.token_service.now())?;

        info!("Access token refreshed");
        Ok(TokenResponse::bearer(access_token))
    }
}
