//! Identity storage for PostgreSQL.

use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use uuid::Uuid;

use crate::{PgPool, StorageResult};

/// Identity storage operations.
pub struct IdentityStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> IdentityStorage<'a> {
    /// Create a new identity storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fresh UUID v4 identity and return it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self) -> StorageResult<String> {
        let guid = Uuid::new_v4().to_string();
        query("INSERT INTO identities (guid) VALUES ($1)")
            .bind(&guid)
            .execute(self.pool)
            .await?;
        Ok(guid)
    }

    /// Check whether an identity exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn exists(&self, guid: &str) -> StorageResult<bool> {
        let exists: bool =
            query_scalar("SELECT EXISTS(SELECT 1 FROM identities WHERE guid = $1)")
                .bind(guid)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }
}
