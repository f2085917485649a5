use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

const DEFAULT_SECRET_KEY: &str = "super-secret";
const DEFAULT_ALGORITHM: &str = "HS256";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Unknown signing algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Signing algorithm {0} needs a key pair; only HS256, HS384 and HS512 are supported")]
    UnsupportedAlgorithm(String),

    #[error("{key} must be an integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("ACCESS_TOKEN_EXPIRE_MINUTES must be positive, got {0}")]
    NonPositiveTtl(i64),
}

/// Signing configuration shared by every token the service issues or accepts
#[derive(Clone)]
pub struct TokenSettings {
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret_key: impl Into<String>, algorithm: Algorithm, ttl: Duration) -> Self {
        Self {
            secret_key: secret_key.into(),
            algorithm,
            ttl,
        }
    }
}

// Keep the secret out of Debug output
impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("ttl_minutes", &self.ttl.num_minutes())
            .finish()
    }
}

/// Process-wide configuration, built once at startup and injected from there
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub database_url: Option<String>,
    pub token: TokenSettings,
}

impl AppConfig {
    /// Reads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("SECRET_KEY").unwrap_or_else(|| {
            warn!("SECRET_KEY not set, falling back to the development secret");
            DEFAULT_SECRET_KEY.to_string()
        });

        let algorithm_name = lookup("ALGORITHM").unwrap_or_else(|| DEFAULT_ALGORITHM.to_string());
        let algorithm = parse_algorithm(&algorithm_name)?;

        let ttl_minutes = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                    value,
                })?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };
        if ttl_minutes <= 0 {
            return Err(ConfigError::NonPositiveTtl(ttl_minutes));
        }

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            token: TokenSettings::new(secret_key, algorithm, Duration::minutes(ttl_minutes)),
        })
    }
}

fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| ConfigError::UnknownAlgorithm(name.to_string()))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(ConfigError::UnsupportedAlgorithm(format!("{:?}", other))),
    }
}
