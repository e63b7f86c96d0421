//! PostgreSQL storage backend for Keyward.
//!
//! Provides persistent storage for:
//!
//! - Identities (`identities` table)
//! - Login sessions (`sessions` table)
//!
//! Revoked access tokens are short-lived and live in Redis instead (see
//! `keyward-auth-redis`).
//!
//! # Example
//!
//! ```ignore
//! use keyward_auth_postgres::PostgresAuthStorage;
//!
//! let storage = PostgresAuthStorage::connect("postgres://localhost/keyward", 10).await?;
//! storage.migrate().await?;
//!
//! let sessions = storage.session_storage();   // Arc<dyn SessionStorage>-ready
//! let identities = storage.identity_storage();
//! ```

pub mod identity;
pub mod schema;
pub mod session;
pub mod storage_adapters;

use std::sync::Arc;

use sqlx_core::pool::Pool;
use sqlx_postgres::{PgPoolOptions, Postgres};

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use identity::IdentityStorage;
pub use session::{SessionRow, SessionStorage};
pub use storage_adapters::{ArcIdentityStorage, ArcSessionStorage};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// PostgreSQL Auth Storage
// =============================================================================

/// PostgreSQL storage backend for identities and sessions.
#[derive(Debug, Clone)]
pub struct PostgresAuthStorage {
    pool: Arc<PgPool>,
}

impl PostgresAuthStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str, max_connections: u32) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        tracing::info!(max_connections, "connected to PostgreSQL");
        Ok(Self::new(Arc::new(pool)))
    }

    /// Creates the tables and indexes this crate needs.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    pub async fn migrate(&self) -> StorageResult<()> {
        schema::migrate(&self.pool).await
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get session storage operations.
    #[must_use]
    pub fn sessions(&self) -> SessionStorage<'_> {
        SessionStorage::new(&self.pool)
    }

    /// Get identity storage operations.
    #[must_use]
    pub fn identities(&self) -> IdentityStorage<'_> {
        IdentityStorage::new(&self.pool)
    }

    /// Session storage that owns a pool handle, for use as `Arc<dyn SessionStorage>`.
    #[must_use]
    pub fn session_storage(&self) -> ArcSessionStorage {
        ArcSessionStorage::new(Arc::clone(&self.pool))
    }

    /// Identity storage that owns a pool handle, for use as `Arc<dyn IdentityStorage>`.
    #[must_use]
    pub fn identity_storage(&self) -> ArcIdentityStorage {
        ArcIdentityStorage::new(Arc::clone(&self.pool))
    }
}
