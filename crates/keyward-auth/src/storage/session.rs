//! Session storage trait.
//!
//! Sessions are keyed by `(identity, id)`. Lookups with a mismatched identity
//! behave as if the session does not exist.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{NewSession, Session, SessionId};

/// Storage trait for login sessions.
///
/// # Example Implementation
///
/// ```ignore
/// use keyward_auth::storage::SessionStorage;
/// use keyward_auth::types::{NewSession, Session, SessionId};
/// use keyward_auth::AuthResult;
///
/// struct MySessionStorage { /* ... */ }
///
/// #[async_trait::async_trait]
/// impl SessionStorage for MySessionStorage {
///     async fn create(&self, session: NewSession) -> AuthResult<SessionId> {
///         // insert and return the generated id
///         todo!()
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Persists a new session and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(&self, session: NewSession) -> AuthResult<SessionId>;

    /// Finds a session by owner and id.
    ///
    /// Returns `None` if no such session exists for that identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find(&self, identity: &str, id: SessionId) -> AuthResult<Option<Session>>;

    /// Deletes a session.
    ///
    /// Deleting a missing session succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, identity: &str, id: SessionId) -> AuthResult<()>;

    /// Atomically deletes the session if it still holds `refresh_hash`.
    ///
    /// Returns `true` if this call removed the session. Of any number of
    /// concurrent calls for the same session, at most one returns `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn consume(
        &self,
        identity: &str,
        id: SessionId,
        refresh_hash: &str,
    ) -> AuthResult<bool>;

    /// Deletes sessions whose refresh lifetime has passed.
    ///
    /// # Returns
    ///
    /// Returns the number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
