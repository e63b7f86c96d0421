//! Identity storage trait.

use async_trait::async_trait;

use crate::AuthResult;

/// Registry of known identities.
///
/// An identity is an opaque UUID string. Nothing else is stored about it; the
/// registry only answers whether an identity was ever created.
#[async_trait]
pub trait IdentityStorage: Send + Sync {
    /// Creates a new identity and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(&self) -> AuthResult<String>;

    /// Returns `true` if the identity exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn exists(&self, identity: &str) -> AuthResult<bool>;
}
