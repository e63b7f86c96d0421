//! Revoked access token storage trait.
//!
//! Access tokens are self-contained, so logging out or rotating cannot
//! invalidate them at the issuer. Instead the raw token is recorded here until
//! the moment it would have expired anyway, and every verification consults
//! this store first.
//!
//! # Security Considerations
//!
//! - Entries must live at least until the token's own expiry
//! - Lookups run on every authenticated call and must be cheap
//! - A failed lookup must be reported as an error, never as "not revoked"

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;

/// Storage trait for revoked access tokens.
///
/// Keys are the raw compact token, without the `Bearer ` prefix.
#[async_trait]
pub trait RevokedTokenStorage: Send + Sync {
    /// Marks a token as revoked until `expires_at`.
    ///
    /// # Arguments
    ///
    /// * `token` - The raw access token
    /// * `expires_at` - The token's own expiry
    ///
    /// # Idempotency
    ///
    /// Revoking an already-revoked token succeeds. If `expires_at` is not in
    /// the future nothing needs to be recorded and the call succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke(&self, token: &str, expires_at: OffsetDateTime) -> AuthResult<()>;

    /// Checks whether a token has been revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be consulted. Callers treat that
    /// as a rejection.
    async fn is_revoked(&self, token: &str) -> AuthResult<bool>;
}
