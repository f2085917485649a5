use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{clock::Clock, errors::TokenError, types::TokenClaims};
use crate::config::TokenSettings;

/// Issues and validates HMAC-signed JWTs with a fixed time-to-live
pub struct TokenService {
    settings: TokenSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(settings: TokenSettings, clock: Arc<dyn Clock>) -> Self {
        let encoding_key = EncodingKey::from_secret(settings.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.secret_key.as_bytes());

        // Expiry is checked against our own clock with no leeway, so the
        // library only verifies signature, algorithm and presence of `exp`.
        let mut validation = Validation::new(settings.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            settings,
            encoding_key,
            decoding_key,
            validation,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.settings.ttl
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Signs a copy of `claims` with `exp = now + ttl`; a caller-supplied `exp` is replaced
    #[instrument(skip(self, claims))]
    pub fn issue(&self, claims: &Map<String, Value>, now: DateTime<Utc>) -> Result<String, TokenError> {
        let exp = (now + self.settings.ttl).timestamp();

        let mut to_encode = claims.clone();
        to_encode.insert("exp".to_string(), Value::from(exp));

        debug!(
            ttl_minutes = self.settings.ttl.num_minutes(),
            exp_timestamp = exp,
            "Issuing JWT token"
        );

        encode(
            &Header::new(self.settings.algorithm),
            &to_encode,
            &self.encoding_key,
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            TokenError::Encoding(e.to_string())
        })
    }

    /// Issues a token whose only caller claim is the subject
    pub fn issue_for_subject(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), Value::from(subject));
        self.issue(&claims, now)
    }

    /// Validates a token against the service clock
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.decode_at(token, self.clock.now())
    }

    /// Validates signature and algorithm, then rejects the token once `now >= exp`
    #[instrument(skip(self, token))]
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Failed to decode JWT token");
                TokenError::from(e)
            })?;

        if now.timestamp() >= claims.exp {
            debug!(
                exp = claims.exp,
                now = now.timestamp(),
                "JWT token has expired"
            );
            return Err(TokenError::Expired);
        }

        debug!(exp = claims.exp, "JWT token decoded successfully");
        Ok(claims)
    }
}
