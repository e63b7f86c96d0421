//! Access token signing and verification.
//!
//! Access tokens are compact JWTs signed with HS512 under a process-wide
//! shared secret. They carry the identity (`sub`), the session they are bound
//! to (`sid`), and an absolute expiry (`exp`). Only the signed claims are
//! trusted; the header is consulted solely to reject any algorithm other than
//! HS512.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use keyward_auth::token::{TokenCodec, strip_bearer};
//!
//! let codec = TokenCodec::new(b"0123456789abcdef0123456789abcdef", Duration::from_secs(900));
//! let token = codec.issue("0b7c6c1e-identity", 42, Duration::from_secs(60)).unwrap();
//!
//! let header = format!("Bearer {token}");
//! let claims = codec.verify(strip_bearer(&header).unwrap(), true).unwrap();
//! assert_eq!(claims.sub, "0b7c6c1e-identity");
//! assert_eq!(claims.sid, 42);
//! ```

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::config::AuthConfig;
use crate::types::SessionId;

/// Authorization scheme prefix of the token wire form.
pub const BEARER_PREFIX: &str = "Bearer ";

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS512;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while issuing or verifying access tokens.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// The token could not be signed.
    #[error("Failed to sign token: {message}")]
    Signing {
        /// Description of the signing failure.
        message: String,
    },

    /// The token could not be parsed.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the parse failure.
        message: String,
    },

    /// The signing algorithm or MAC does not match.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token's embedded expiry is in the past.
    #[error("Token expired")]
    Expired,

    /// The credential is not in `Bearer <token>` form.
    #[error("Invalid authorization format")]
    BadFormat,
}

impl JwtError {
    /// Creates a new `Signing` error.
    #[must_use]
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Returns `true` if the token was rejected during verification, as
    /// opposed to failing to be produced.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Malformed { .. } | Self::InvalidSignature | Self::Expired | Self::BadFormat
        )
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::InvalidSignature,
            _ => Self::malformed(err.to_string()),
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Identity the token was issued to.
    pub sub: String,

    /// Session the token is bound to.
    pub sid: SessionId,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Unique token id.
    pub jti: String,
}

impl AccessClaims {
    /// Returns the token expiry as a timestamp.
    ///
    /// Out-of-range values clamp to the Unix epoch, which every revocation
    /// store treats as already expired.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.exp).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Signs and verifies access tokens with a shared symmetric secret.
///
/// The codec is immutable after construction and is shared across tasks
/// behind an `Arc`.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_lifetime: Duration,
}

impl TokenCodec {
    /// Creates a codec from a raw secret and the default access token lifetime.
    #[must_use]
    pub fn new(secret: &[u8], access_token_lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_token_lifetime,
        }
    }

    /// Creates a codec from validated configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.secret_key.as_bytes(), config.access_token_lifetime)
    }

    /// Returns the configured access token lifetime.
    #[must_use]
    pub fn access_token_lifetime(&self) -> Duration {
        self.access_token_lifetime
    }

    /// Issues a token for `identity` bound to `session_id`, valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Signing` if the token cannot be signed.
    pub fn issue(
        &self,
        identity: &str,
        session_id: SessionId,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let now = OffsetDateTime::now_utc();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        self.sign(AccessClaims {
            sub: identity.to_string(),
            sid: session_id,
            exp: now.unix_timestamp().saturating_add(ttl_secs),
            iat: now.unix_timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        })
    }

    /// Issues a token with an explicit absolute expiry.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Signing` if the token cannot be signed.
    pub fn issue_with_expiry(
        &self,
        identity: &str,
        session_id: SessionId,
        expires_at: OffsetDateTime,
    ) -> Result<String, JwtError> {
        self.sign(AccessClaims {
            sub: identity.to_string(),
            sid: session_id,
            exp: expires_at.unix_timestamp(),
            iat: OffsetDateTime::now_utc().unix_timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        })
    }

    fn sign(&self, claims: AccessClaims) -> Result<String, JwtError> {
        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| JwtError::signing(e.to_string()))
    }

    /// Verifies a raw token (without the `Bearer ` prefix) and returns its claims.
    ///
    /// With `enforce_expiry = false` an expired token is still accepted as
    /// long as its signature is valid. Only refresh rotation does that.
    ///
    /// # Errors
    ///
    /// - `JwtError::InvalidSignature` for a foreign algorithm or bad MAC
    /// - `JwtError::Malformed` if the token cannot be parsed
    /// - `JwtError::Expired` if `enforce_expiry` is set and `exp` has passed
    pub fn verify(&self, token: &str, enforce_expiry: bool) -> Result<AccessClaims, JwtError> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = enforce_expiry;
        validation.leeway = 0;

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(JwtError::from)
    }
}

/// Strips the `Bearer ` scheme from an authorization value.
///
/// # Errors
///
/// Returns `JwtError::BadFormat` if the prefix is missing or nothing follows it.
pub fn strip_bearer(value: &str) -> Result<&str, JwtError> {
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(JwtError::BadFormat)
}

// ============================================================================
// Tests
// ============================================================================
