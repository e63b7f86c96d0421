//! Revocation store errors.

/// Errors raised by the Redis revocation store.
#[derive(Debug, thiserror::Error)]
pub enum RevocationStoreError {
    /// The connection pool could not be built.
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),

    /// No connection could be checked out.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// A Redis command failed.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}
