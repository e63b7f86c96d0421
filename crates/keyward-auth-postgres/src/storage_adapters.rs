//! Arc-owning storage adapters.
//!
//! These adapters wrap the lifetime-based storage types and own an
//! `Arc<PgPool>`, so they can be handed to the session service as
//! `Arc<dyn SessionStorage>` / `Arc<dyn IdentityStorage>`.

use std::sync::Arc;

use async_trait::async_trait;

use keyward_auth::storage::{
    IdentityStorage as IdentityStorageTrait, SessionStorage as SessionStorageTrait,
};
use keyward_auth::types::{NewSession, Session, SessionId};
use keyward_auth::{AuthError, AuthResult};

use crate::identity::IdentityStorage;
use crate::session::SessionStorage;
use crate::{PgPool, StorageError};

fn storage_error(err: StorageError) -> AuthError {
    AuthError::storage(err.to_string())
}

// =============================================================================
// Arc-Owning Session Storage
// =============================================================================

/// Arc-owning PostgreSQL session storage adapter.
#[derive(Clone)]
pub struct ArcSessionStorage {
    pool: Arc<PgPool>,
}

impl ArcSessionStorage {
    /// Create a new Arc-owning session storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStorageTrait for ArcSessionStorage {
    async fn create(&self, session: NewSession) -> AuthResult<SessionId> {
        SessionStorage::new(&self.pool)
            .create(
                &session.identity,
                &session.refresh_hash,
                &session.fingerprint,
                session.expires_at,
            )
            .await
            .map_err(storage_error)
    }

    async fn find(&self, identity: &str, id: SessionId) -> AuthResult<Option<Session>> {
        let row = SessionStorage::new(&self.pool)
            .find(identity, id)
            .await
            .map_err(storage_error)?;
        Ok(row.map(Session::from))
    }

    async fn delete(&self, identity: &str, id: SessionId) -> AuthResult<()> {
        SessionStorage::new(&self.pool)
            .delete(identity, id)
            .await
            .map_err(storage_error)
    }

    async fn consume(
        &self,
        identity: &str,
        id: SessionId,
        refresh_hash: &str,
    ) -> AuthResult<bool> {
        SessionStorage::new(&self.pool)
            .consume(identity, id, refresh_hash)
            .await
            .map_err(storage_error)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        SessionStorage::new(&self.pool)
            .cleanup_expired()
            .await
            .map_err(storage_error)
    }
}

// =============================================================================
// Arc-Owning Identity Storage
// =============================================================================

/// Arc-owning PostgreSQL identity storage adapter.
#[derive(Clone)]
pub struct ArcIdentityStorage {
    pool: Arc<PgPool>,
}

impl ArcIdentityStorage {
    /// Create a new Arc-owning identity storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStorageTrait for ArcIdentityStorage {
    async fn create(&self) -> AuthResult<String> {
        IdentityStorage::new(&self.pool)
            .create()
            .await
            .map_err(storage_error)
    }

    async fn exists(&self, identity: &str) -> AuthResult<bool> {
        IdentityStorage::new(&self.pool)
            .exists(identity)
            .await
            .map_err(storage_error)
    }
}
