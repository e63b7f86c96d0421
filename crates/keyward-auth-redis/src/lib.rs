//! Redis-backed revoked access token storage for Keyward.
//!
//! Each revoked token becomes one key, `<prefix><token>`, holding the value
//! `"revoked"` with a TTL equal to the token's remaining lifetime. Redis drops
//! the key on its own once the token could no longer be used anyway, so no
//! cleanup job is needed.
//!
//! Lookups that fail (pool exhausted, connection refused) surface as errors;
//! the session service turns them into rejections.

pub mod config;
pub mod error;

use async_trait::async_trait;
use deadpool_redis::{Pool, PoolConfig, Runtime};
use redis::AsyncCommands;
use time::OffsetDateTime;

use keyward_auth::storage::RevokedTokenStorage;
use keyward_auth::{AuthError, AuthResult};

pub use config::RedisRevocationConfig;
pub use error::RevocationStoreError;

/// Value stored under every revocation key.
const REVOKED_MARKER: &str = "revoked";

/// Redis-backed [`RevokedTokenStorage`].
#[derive(Clone)]
pub struct RedisRevokedTokenStorage {
    pool: Pool,
    key_prefix: String,
}

impl RedisRevokedTokenStorage {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: Pool, key_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.into(),
        }
    }

    /// Builds a pool from configuration and checks that Redis answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or the first
    /// connection fails.
    pub async fn connect(config: &RedisRevocationConfig) -> Result<Self, RevocationStoreError> {
        tracing::info!(url = %config.url, "connecting to Redis");

        let mut pool_config = PoolConfig::new(config.pool_size);
        pool_config.timeouts.wait = Some(config.timeout);
        pool_config.timeouts.create = Some(config.timeout);
        pool_config.timeouts.recycle = Some(config.timeout);

        let mut redis_config = deadpool_redis::Config::from_url(&config.url);
        redis_config.pool = Some(pool_config);

        let pool = redis_config.create_pool(Some(Runtime::Tokio1))?;
        drop(pool.get().await?);
        tracing::info!("connected to Redis");

        Ok(Self::new(pool, config.key_prefix.clone()))
    }

    fn key(&self, token: &str) -> String {
        format!("{}{}", self.key_prefix, token)
    }

    async fn set_revoked(&self, key: &str, ttl_secs: u64) -> Result<(), RevocationStoreError> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(key, REVOKED_MARKER, ttl_secs)
            .await?;
        Ok(())
    }

    async fn key_exists(&self, key: &str) -> Result<bool, RevocationStoreError> {
        let mut conn = self.pool.get().await?;
        Ok(conn.exists::<_, bool>(key).await?)
    }
}

/// Whole seconds until `expires_at`, rounded up; `None` if already past.
fn remaining_ttl_secs(expires_at: OffsetDateTime, now: OffsetDateTime) -> Option<u64> {
    let remaining = expires_at - now;
    if remaining <= time::Duration::ZERO {
        return None;
    }
    let secs = remaining.whole_seconds() + i64::from(remaining.subsec_nanoseconds() > 0);
    u64::try_from(secs).ok()
}

#[async_trait]
impl RevokedTokenStorage for RedisRevokedTokenStorage {
    async fn revoke(&self, token: &str, expires_at: OffsetDateTime) -> AuthResult<()> {
        let Some(ttl_secs) = remaining_ttl_secs(expires_at, OffsetDateTime::now_utc()) else {
            tracing::debug!("token already expired, nothing to revoke");
            return Ok(());
        };

        self.set_revoked(&self.key(token), ttl_secs)
            .await
            .map_err(|e| AuthError::storage(e.to_string()))?;
        tracing::debug!(ttl_secs, "access token revoked");
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        self.key_exists(&self.key(token))
            .await
            .map_err(|e| AuthError::storage(e.to_string()))
    }
}
