//! Periodic purge of expired sessions and revocations.

use std::sync::Arc;
use std::time::Duration;

use keyward_auth::SessionService;
use keyward_auth::storage::InMemoryRevokedTokenStorage;
use tokio::task::JoinHandle;

/// Spawns the cleanup loop. Returns `None` when `interval` is zero.
pub fn spawn_session_cleanup(
    service: SessionService,
    memory_revocations: Option<Arc<InMemoryRevokedTokenStorage>>,
    interval: Duration,
) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        tracing::info!("session cleanup disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match service.cleanup_expired_sessions().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "purged expired sessions"),
                Err(e) => tracing::warn!(error = %e, "session cleanup failed"),
            }
            if let Some(store) = &memory_revocations {
                let purged = store.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "purged expired revocations");
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_auth::AuthConfig;
    use keyward_auth::storage::{InMemoryIdentityStorage, InMemorySessionStorage};

    fn service() -> SessionService {
        SessionService::from_config(
            &AuthConfig::with_secret("0123456789abcdef0123456789abcdef"),
            Arc::new(InMemoryIdentityStorage::new()),
            Arc::new(InMemorySessionStorage::new()),
            Arc::new(InMemoryRevokedTokenStorage::new()),
        )
    }

    #[tokio::test]
    async fn test_zero_interval_disables() {
        assert!(spawn_session_cleanup(service(), None, Duration::ZERO).is_none());
    }

    #[tokio::test]
    async fn test_loop_runs_until_aborted() {
        let handle =
            spawn_session_cleanup(service(), None, Duration::from_millis(10)).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
