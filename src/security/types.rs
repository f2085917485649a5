use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::user::models::UserModel;

/// Decoded token payload: `sub` and `exp` plus whatever else the issuer added
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64, // NumericDate, seconds since the epoch
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response body for the token endpoints
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
        }
    }
}

/// A user resolved from a valid bearer token. Only `AuthService::authenticate`
/// constructs one, so holding it proves the token was valid when presented.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    user: UserModel,
}

impl CurrentUser {
    pub(super) fn new(user: UserModel) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &UserModel {
        &self.user
    }

    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn into_inner(self) -> UserModel {
        self.user
    }
}

/// OAuth2 password-flow form posted to `/auth/token`
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
