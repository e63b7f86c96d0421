//! Integration tests against a real Redis instance.
//!
//! Requires Docker. Run with `cargo test -p keyward-auth-redis -- --ignored`.

use std::time::Duration;

use keyward_auth::storage::RevokedTokenStorage;
use keyward_auth_redis::{RedisRevocationConfig, RedisRevokedTokenStorage};
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::redis::Redis;
use time::OffsetDateTime;

#[tokio::test]
#[ignore = "requires docker"]
async fn test_revoke_and_expire() {
    let container = Redis::default()
        .start()
        .await
        .expect("start redis container");
    let port = container.get_host_port_ipv4(6379).await.expect("get port");

    let config = RedisRevocationConfig {
        url: format!("redis://127.0.0.1:{port}"),
        ..RedisRevocationConfig::default()
    };
    let store = RedisRevokedTokenStorage::connect(&config).await.unwrap();

    assert!(!store.is_revoked("token-a").await.unwrap());

    let soon = OffsetDateTime::now_utc() + time::Duration::seconds(1);
    store.revoke("token-a", soon).await.unwrap();
    store.revoke("token-a", soon).await.unwrap();
    assert!(store.is_revoked("token-a").await.unwrap());
    assert!(!store.is_revoked("token-b").await.unwrap());

    // Past expiry is a no-op.
    store
        .revoke("token-c", OffsetDateTime::now_utc() - time::Duration::seconds(5))
        .await
        .unwrap();
    assert!(!store.is_revoked("token-c").await.unwrap());

    // Redis drops the entry once the token would have expired.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(!store.is_revoked("token-a").await.unwrap());
}

#[tokio::test]
async fn test_unreachable_redis_is_an_error() {
    let config = RedisRevocationConfig {
        url: "redis://127.0.0.1:1".to_string(),
        timeout: Duration::from_millis(200),
        ..RedisRevocationConfig::default()
    };
    assert!(RedisRevokedTokenStorage::connect(&config).await.is_err());
}
