use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use thiserror::Error;

/// Failures from decoding or issuing a signed token
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token could not be encoded: {0}")]
    Encoding(String),
}

impl From<JwtError> for TokenError {
    fn from(error: JwtError) -> Self {
        match error.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
                TokenError::InvalidSignature
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// Everything that can stop a bearer token from resolving to a user.
/// Only `Lookup` is reported to clients as something other than a
/// credentials failure.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("token carries no subject")]
    MissingSubject,

    #[error("token subject does not match any user")]
    UnknownSubject,

    #[error("identity lookup failed: {0}")]
    Lookup(String),
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
}
