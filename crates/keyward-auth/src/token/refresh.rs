//! Opaque refresh secret generation.
//!
//! Refresh secrets are random bytes from the operating system's CSPRNG,
//! standard-base64 encoded. The plaintext leaves the service exactly once, in
//! the issued token pair; only its Argon2id hash is persisted (see
//! [`crate::secret`]).

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Produces refresh secrets and reports their configured lifetime.
#[derive(Debug, Clone)]
pub struct RefreshSecretGenerator {
    length: usize,
    lifetime: Duration,
}

impl RefreshSecretGenerator {
    /// Creates a generator producing `length` random bytes per secret.
    #[must_use]
    pub fn new(length: usize, lifetime: Duration) -> Self {
        Self { length, lifetime }
    }

    /// Creates a generator from validated configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.refresh_secret_length, config.refresh_token_lifetime)
    }

    /// Generates a new plaintext refresh secret.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the random source fails.
    pub fn generate(&self) -> AuthResult<String> {
        let mut bytes = vec![0u8; self.length];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            tracing::error!(error = %e, "entropy source failed");
            AuthError::internal("failed to generate refresh secret")
        })?;
        Ok(STANDARD.encode(bytes))
    }

    /// Returns the configured refresh secret lifetime.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}
