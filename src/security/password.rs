use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::{debug, instrument};

use super::errors::PasswordError;

/// Hashes passwords with Argon2id and checks candidates against stored PHC strings
#[derive(Clone)]
pub struct CredentialVerifier {
    argon2: Argon2<'static>,
}

impl CredentialVerifier {
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Uses explicit cost parameters for new hashes. Verification always
    /// honours the parameters recorded in the stored hash.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Produces a salted hash; every call draws a fresh salt
    #[instrument(skip_all)]
    pub fn hash(&self, credential: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(credential.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?
            .to_string();

        debug!("Password hashed");
        Ok(hash)
    }

    /// Returns true only when `candidate` matches `stored_hash`.
    /// Malformed hashes and foreign algorithms read as a mismatch.
    #[instrument(skip_all)]
    pub fn verify(&self, candidate: &str, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Stored password hash could not be parsed");
                return false;
            }
        };

        self.argon2
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for CredentialVerifier {
    fn default() -> Self {
        Self::new()
    }
}
