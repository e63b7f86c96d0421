//! Token and session configuration.
//!
//! The configuration is built once at startup, validated, and then used to
//! construct the [`TokenCodec`](crate::token::TokenCodec) and
//! [`RefreshSecretGenerator`](crate::token::RefreshSecretGenerator). Nothing in
//! this crate reads configuration after that point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Minimum accepted length of the HMAC signing secret, in bytes.
pub const MIN_SECRET_KEY_LEN: usize = 32;

/// Minimum accepted number of random bytes in a refresh secret.
pub const MIN_REFRESH_SECRET_LEN: usize = 16;

/// Upper bound on either token lifetime (ten years).
pub const MAX_LIFETIME: Duration = Duration::from_secs(10 * 365 * 24 * 3600);

/// Token lifecycle configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// secret_key = "change-me-change-me-change-me-change-me"
/// access_token_lifetime = "15m"
/// refresh_token_lifetime = "30d"
/// refresh_secret_length = 32
/// ```
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HS512 secret used to sign and verify access tokens.
    pub secret_key: String,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh secret (and therefore session) lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Number of random bytes in a refresh secret before base64 encoding.
    pub refresh_secret_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            access_token_lifetime: Duration::from_secs(15 * 60),
            refresh_token_lifetime: Duration::from_secs(30 * 24 * 3600),
            refresh_secret_length: 32,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"<redacted>")
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .field("refresh_secret_length", &self.refresh_secret_length)
            .finish()
    }
}

impl AuthConfig {
    /// Creates a configuration with the given secret and default lifetimes.
    #[must_use]
    pub fn with_secret(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the secret key is empty, and
    /// `ConfigError::InvalidValue` if:
    /// - The secret key is shorter than [`MIN_SECRET_KEY_LEN`] bytes
    /// - Either lifetime is zero or exceeds [`MAX_LIFETIME`]
    /// - The refresh secret length is below [`MIN_REFRESH_SECRET_LEN`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.is_empty() {
            return Err(ConfigError::Missing("auth.secret_key".to_string()));
        }

        if self.secret_key.len() < MIN_SECRET_KEY_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "secret_key must be at least {MIN_SECRET_KEY_LEN} bytes"
            )));
        }

        if self.access_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.refresh_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must be > 0".to_string(),
            ));
        }

        for (name, lifetime) in [
            ("access_token_lifetime", self.access_token_lifetime),
            ("refresh_token_lifetime", self.refresh_token_lifetime),
        ] {
            if lifetime > MAX_LIFETIME {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must not exceed {} days",
                    MAX_LIFETIME.as_secs() / 86_400
                )));
            }
        }

        if self.refresh_secret_length < MIN_REFRESH_SECRET_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "refresh_secret_length must be >= {MIN_REFRESH_SECRET_LEN}"
            )));
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}
