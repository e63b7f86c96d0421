//! In-memory storage backends.
//!
//! Backed by [`DashMap`], so every operation is a short shard-local critical
//! section and the stores can be shared freely behind an `Arc`. State is lost
//! on restart; use the PostgreSQL and Redis backends when that matters.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::storage::{IdentityStorage, RevokedTokenStorage, SessionStorage};
use crate::types::{NewSession, Session, SessionId};

// ============================================================================
// Identities
// ============================================================================

/// In-memory identity registry.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStorage {
    identities: DashMap<String, OffsetDateTime>,
}

impl InMemoryIdentityStorage {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStorage for InMemoryIdentityStorage {
    async fn create(&self) -> AuthResult<String> {
        let identity = uuid::Uuid::new_v4().to_string();
        self.identities
            .insert(identity.clone(), OffsetDateTime::now_utc());
        Ok(identity)
    }

    async fn exists(&self, identity: &str) -> AuthResult<bool> {
        Ok(self.identities.contains_key(identity))
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// In-memory session store.
#[derive(Debug)]
pub struct InMemorySessionStorage {
    sessions: DashMap<SessionId, Session>,
    next_id: AtomicI64,
}

impl Default for InMemorySessionStorage {
    fn default() -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemorySessionStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently held, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn create(&self, session: NewSession) -> AuthResult<SessionId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sessions.insert(
            id,
            Session {
                id,
                identity: session.identity,
                refresh_hash: session.refresh_hash,
                fingerprint: session.fingerprint,
                expires_at: session.expires_at,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(id)
    }

    async fn find(&self, identity: &str, id: SessionId) -> AuthResult<Option<Session>> {
        Ok(self
            .sessions
            .get(&id)
            .filter(|entry| entry.identity == identity)
            .map(|entry| entry.value().clone()))
    }

    async fn delete(&self, identity: &str, id: SessionId) -> AuthResult<()> {
        self.sessions
            .remove_if(&id, |_, session| session.identity == identity);
        Ok(())
    }

    async fn consume(
        &self,
        identity: &str,
        id: SessionId,
        refresh_hash: &str,
    ) -> AuthResult<bool> {
        Ok(self
            .sessions
            .remove_if(&id, |_, session| {
                session.identity == identity && session.refresh_hash == refresh_hash
            })
            .is_some())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = OffsetDateTime::now_utc();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.expires_at > now);
        Ok(before.saturating_sub(self.sessions.len()) as u64)
    }
}

// ============================================================================
// Revoked tokens
// ============================================================================

/// In-memory revoked token denylist.
///
/// Entries expire lazily: a lookup that finds a stale entry removes it and
/// reports the token as not revoked.
#[derive(Debug, Default)]
pub struct InMemoryRevokedTokenStorage {
    revoked: DashMap<String, OffsetDateTime>,
}

impl InMemoryRevokedTokenStorage {
    /// Creates an empty denylist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entry whose token has expired.
    pub fn purge_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let before = self.revoked.len();
        self.revoked.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.revoked.len())
    }
}

#[async_trait]
impl RevokedTokenStorage for InMemoryRevokedTokenStorage {
    async fn revoke(&self, token: &str, expires_at: OffsetDateTime) -> AuthResult<()> {
        if expires_at <= OffsetDateTime::now_utc() {
            return Ok(());
        }
        self.revoked
            .entry(token.to_string())
            .and_modify(|existing| {
                if expires_at > *existing {
                    *existing = expires_at;
                }
            })
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        let now = OffsetDateTime::now_utc();
        match self.revoked.get(token).map(|entry| *entry.value()) {
            Some(expires_at) if expires_at > now => Ok(true),
            Some(_) => {
                self.revoked
                    .remove_if(token, |_, expires_at| *expires_at <= now);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fingerprint;
    use time::Duration;

    fn new_session(identity: &str, hash: &str, expires_at: OffsetDateTime) -> NewSession {
        NewSession {
            identity: identity.to_string(),
            refresh_hash: hash.to_string(),
            fingerprint: Fingerprint::new("ua", "10.0.0.1").unwrap(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_identity_create_exists() {
        let store = InMemoryIdentityStorage::new();
        let id = store.create().await.unwrap();

        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert!(store.exists(&id).await.unwrap());
        assert!(!store.exists("unknown").await.unwrap());
    }

    #[tokio::test]
    async fn test_session_ids_are_distinct() {
        let store = InMemorySessionStorage::new();
        let expires = OffsetDateTime::now_utc() + Duration::hours(1);

        let a = store.create(new_session("u", "h1", expires)).await.unwrap();
        let b = store.create(new_session("u", "h2", expires)).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_find_is_scoped_to_identity() {
        let store = InMemorySessionStorage::new();
        let expires = OffsetDateTime::now_utc() + Duration::hours(1);
        let id = store.create(new_session("u1", "h", expires)).await.unwrap();

        assert!(store.find("u1", id).await.unwrap().is_some());
        assert!(store.find("u2", id).await.unwrap().is_none());

        // Deleting under the wrong identity is a no-op.
        store.delete("u2", id).await.unwrap();
        assert!(store.find("u1", id).await.unwrap().is_some());

        store.delete("u1", id).await.unwrap();
        assert!(store.find("u1", id).await.unwrap().is_none());

        // Idempotent.
        store.delete("u1", id).await.unwrap();
    }

    #[tokio::test]
    async fn test_consume_succeeds_once() {
        let store = InMemorySessionStorage::new();
        let expires = OffsetDateTime::now_utc() + Duration::hours(1);
        let id = store.create(new_session("u", "h", expires)).await.unwrap();

        assert!(!store.consume("u", id, "other-hash").await.unwrap());
        assert!(store.consume("u", id, "h").await.unwrap());
        assert!(!store.consume("u", id, "h").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_consume_single_winner() {
        let store = std::sync::Arc::new(InMemorySessionStorage::new());
        let expires = OffsetDateTime::now_utc() + Duration::hours(1);
        let id = store.create(new_session("u", "h", expires)).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.consume("u", id, "h").await.unwrap() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let store = InMemorySessionStorage::new();
        let now = OffsetDateTime::now_utc();
        store
            .create(new_session("u", "a", now - Duration::minutes(1)))
            .await
            .unwrap();
        let live = store
            .create(new_session("u", "b", now + Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(store.cleanup_expired().await.unwrap(), 1);
        assert!(store.find("u", live).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_revoke_and_lookup() {
        let store = InMemoryRevokedTokenStorage::new();
        let expires = OffsetDateTime::now_utc() + Duration::minutes(5);

        assert!(!store.is_revoked("t").await.unwrap());
        store.revoke("t", expires).await.unwrap();
        store.revoke("t", expires).await.unwrap();
        assert!(store.is_revoked("t").await.unwrap());
        assert!(!store.is_revoked("other").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_already_expired_is_noop() {
        let store = InMemoryRevokedTokenStorage::new();
        store
            .revoke("t", OffsetDateTime::now_utc() - Duration::seconds(1))
            .await
            .unwrap();
        assert!(!store.is_revoked("t").await.unwrap());
        assert_eq!(store.purge_expired(), 0);
    }

    #[tokio::test]
    async fn test_stale_entry_expires_lazily() {
        let store = InMemoryRevokedTokenStorage::new();
        // Bypass the revoke guard to plant an entry that has since expired.
        store.revoked.insert(
            "stale".to_string(),
            OffsetDateTime::now_utc() - Duration::seconds(5),
        );

        assert!(!store.is_revoked("stale").await.unwrap());
        assert!(store.revoked.is_empty());
    }
}
