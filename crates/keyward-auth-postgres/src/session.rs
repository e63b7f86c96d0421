//! Session storage for PostgreSQL.
//!
//! Rows live in the `sessions` table. The refresh secret is stored only as
//! an Argon2id PHC string; [`SessionStorage::consume`] compares that string
//! inside the `DELETE` so concurrent refreshes cannot both succeed.

use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_core::query_scalar::query_scalar;
use time::OffsetDateTime;

use keyward_auth::types::{Fingerprint, Session, SessionId};

use crate::{PgPool, StorageResult};

/// Row from the `sessions` table.
#[derive(Debug, Clone)]
pub struct SessionRow {
    pub id: i64,
    pub identity: String,
    pub refresh_hash: String,
    pub expires_at: OffsetDateTime,
    pub user_agent: String,
    pub source_ip: String,
    pub created_at: OffsetDateTime,
}

type SessionTuple = (
    i64,
    String,
    String,
    OffsetDateTime,
    String,
    String,
    OffsetDateTime,
);

impl SessionRow {
    fn from_tuple(row: SessionTuple) -> Self {
        Self {
            id: row.0,
            identity: row.1,
            refresh_hash: row.2,
            expires_at: row.3,
            user_agent: row.4,
            source_ip: row.5,
            created_at: row.6,
        }
    }
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            identity: row.identity,
            refresh_hash: row.refresh_hash,
            fingerprint: Fingerprint {
                user_agent: row.user_agent,
                source_ip: row.source_ip,
            },
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Session storage operations.
pub struct SessionStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionStorage<'a> {
    /// Create a new session storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a session and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including when the identity does
    /// not exist (foreign key violation).
    pub async fn create(
        &self,
        identity: &str,
        refresh_hash: &str,
        fingerprint: &Fingerprint,
        expires_at: OffsetDateTime,
    ) -> StorageResult<SessionId> {
        let id: i64 = query_scalar(
            r#"
            INSERT INTO sessions (identity, refresh_hash, expires_at, user_agent, source_ip)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(identity)
        .bind(refresh_hash)
        .bind(expires_at)
        .bind(&fingerprint.user_agent)
        .bind(&fingerprint.source_ip)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Find a session by owner and id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, identity: &str, id: SessionId) -> StorageResult<Option<SessionRow>> {
        let row: Option<SessionTuple> = query_as(
            r#"
            SELECT id, identity, refresh_hash, expires_at, user_agent, source_ip, created_at
            FROM sessions
            WHERE identity = $1 AND id = $2
            "#,
        )
        .bind(identity)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(SessionRow::from_tuple))
    }

    /// Delete a session. Deleting a missing session succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, identity: &str, id: SessionId) -> StorageResult<()> {
        query("DELETE FROM sessions WHERE identity = $1 AND id = $2")
            .bind(identity)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Delete the session only if it still holds `refresh_hash`.
    ///
    /// Returns `true` if this call removed the row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn consume(
        &self,
        identity: &str,
        id: SessionId,
        refresh_hash: &str,
    ) -> StorageResult<bool> {
        let rows_affected = query(
            r#"
            DELETE FROM sessions
            WHERE identity = $1 AND id = $2 AND refresh_hash = $3
            "#,
        )
        .bind(identity)
        .bind(id)
        .bind(refresh_hash)
        .execute(self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected == 1)
    }

    /// Delete sessions whose refresh lifetime has passed.
    ///
    /// Returns the number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn cleanup_expired(&self) -> StorageResult<u64> {
        let result = query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Count live sessions for an identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_for_identity(&self, identity: &str) -> StorageResult<i64> {
        let count: i64 = query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE identity = $1 AND expires_at > NOW()",
        )
        .bind(identity)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_into_session() {
        let now = OffsetDateTime::now_utc();
        let row = SessionRow::from_tuple((
            7,
            "guid".to_string(),
            "$argon2id$hash".to_string(),
            now,
            "curl/8.0".to_string(),
            "10.0.0.1".to_string(),
            now,
        ));

        let session = Session::from(row);
        assert_eq!(session.id, 7);
        assert_eq!(session.identity, "guid");
        assert_eq!(session.fingerprint.user_agent, "curl/8.0");
        assert_eq!(session.fingerprint.source_ip, "10.0.0.1");
        assert_eq!(session.expires_at, now);
    }
}
