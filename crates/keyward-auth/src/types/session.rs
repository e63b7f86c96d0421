//! Session domain types.
//!
//! # Security
//!
//! - Only an Argon2id hash of the refresh secret is stored, never plaintext
//! - A session is single use: a successful refresh consumes it and starts a
//!   new one

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Fingerprint;

/// Store-assigned session identifier, unique among live sessions.
pub type SessionId = i64;

/// A persisted login session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Store-assigned id.
    pub id: SessionId,

    /// Identity that owns the session.
    pub identity: String,

    /// PHC-formatted hash of the refresh secret.
    pub refresh_hash: String,

    /// Client metadata captured when the session started.
    pub fingerprint: Fingerprint,

    /// When the refresh secret stops being accepted.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When the session was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Session {
    /// Returns `true` if the session's refresh lifetime has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }
}

/// Data needed to create a session; the store assigns id and creation time.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Owning identity.
    pub identity: String,

    /// PHC-formatted hash of the refresh secret.
    pub refresh_hash: String,

    /// Client metadata captured at login.
    pub fingerprint: Fingerprint,

    /// Refresh expiry.
    pub expires_at: OffsetDateTime,
}

/// Credentials returned to the client after login or refresh.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    /// Signed access token.
    pub access: String,

    /// Opaque refresh secret (base64).
    pub refresh: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}
