//! Wiring of storage, revocation, and notification backends.

use std::sync::Arc;

use anyhow::Context;
use keyward_auth::SessionService;
use keyward_auth::notify::{NoopNotifier, SessionNotifier};
use keyward_auth::storage::{
    IdentityStorage, InMemoryIdentityStorage, InMemoryRevokedTokenStorage,
    InMemorySessionStorage, RevokedTokenStorage, SessionStorage,
};
use keyward_auth_postgres::PostgresAuthStorage;
use keyward_auth_redis::RedisRevokedTokenStorage;
use keyward_notifications::WebhookNotifier;

use crate::config::{KeywardConfig, RevocationBackend, StorageBackend};

/// A ready session service plus handles the maintenance task needs.
pub struct Backends {
    pub service: SessionService,
    /// Set when revocations live in process memory and need periodic purging.
    pub memory_revocations: Option<Arc<InMemoryRevokedTokenStorage>>,
}

/// Builds every backend named in `config` and the service on top of them.
pub async fn build_backends(config: &KeywardConfig) -> anyhow::Result<Backends> {
    let (identities, sessions): (Arc<dyn IdentityStorage>, Arc<dyn SessionStorage>) =
        match config.storage.backend {
            StorageBackend::Memory => {
                tracing::info!("using in-memory session storage");
                (
                    Arc::new(InMemoryIdentityStorage::new()),
                    Arc::new(InMemorySessionStorage::new()),
                )
            }
            StorageBackend::Postgres => {
                let url = config
                    .storage
                    .postgres
                    .url
                    .as_deref()
                    .context("storage.postgres.url is not set")?;
                let storage =
                    PostgresAuthStorage::connect(url, config.storage.postgres.pool_size)
                        .await
                        .context("failed to connect to PostgreSQL")?;
                storage
                    .migrate()
                    .await
                    .context("failed to apply session schema")?;
                tracing::info!("using PostgreSQL session storage");
                (
                    Arc::new(storage.identity_storage()),
                    Arc::new(storage.session_storage()),
                )
            }
        };

    let mut memory_revocations = None;
    let revoked: Arc<dyn RevokedTokenStorage> = match config.revocation.backend {
        RevocationBackend::Memory => {
            let store = Arc::new(InMemoryRevokedTokenStorage::new());
            memory_revocations = Some(store.clone());
            store
        }
        RevocationBackend::Redis => Arc::new(
            RedisRevokedTokenStorage::connect(&config.revocation.redis)
                .await
                .context("failed to connect to Redis")?,
        ),
    };

    let notifier: Arc<dyn SessionNotifier> = if config.notifications.is_enabled() {
        tracing::info!("address change webhook enabled");
        Arc::new(
            WebhookNotifier::new(&config.notifications)
                .context("invalid notifications configuration")?,
        )
    } else {
        Arc::new(NoopNotifier)
    };

    let service = SessionService::from_config(&config.auth, identities, sessions, revoked)
        .with_notifier(notifier);

    Ok(Backends {
        service,
        memory_revocations,
    })
}
