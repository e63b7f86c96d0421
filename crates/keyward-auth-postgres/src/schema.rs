//! Schema bootstrap.
//!
//! Every statement is idempotent, so running [`migrate`] on each startup is
//! safe. Statements run one per query; the extended query protocol rejects
//! multi-statement strings.

use sqlx_core::query::query;

use crate::{PgPool, StorageResult};

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS identities (
        guid        TEXT PRIMARY KEY,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id            BIGSERIAL PRIMARY KEY,
        identity      TEXT NOT NULL REFERENCES identities (guid) ON DELETE CASCADE,
        refresh_hash  TEXT NOT NULL,
        expires_at    TIMESTAMPTZ NOT NULL,
        user_agent    TEXT NOT NULL,
        source_ip     TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS sessions_identity_idx ON sessions (identity)",
    "CREATE INDEX IF NOT EXISTS sessions_expires_at_idx ON sessions (expires_at)",
];

/// Creates the `identities` and `sessions` tables if missing.
///
/// # Errors
///
/// Returns an error if any statement fails.
pub async fn migrate(pool: &PgPool) -> StorageResult<()> {
    for statement in STATEMENTS {
        query(statement).execute(pool).await?;
    }
    tracing::info!(statements = STATEMENTS.len(), "database schema ready");
    Ok(())
}
