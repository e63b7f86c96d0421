//! Redis connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default key namespace for revoked tokens.
pub const DEFAULT_KEY_PREFIX: &str = "keyward:revoked:";

/// Redis connection settings for the revocation store.
///
/// # Example (TOML)
///
/// ```toml
/// [revocation.redis]
/// url = "redis://127.0.0.1:6379"
/// pool_size = 16
/// timeout = "2s"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisRevocationConfig {
    /// Redis connection URL.
    pub url: String,

    /// Maximum pooled connections.
    pub pool_size: usize,

    /// Wait, create, and recycle timeout for pooled connections.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Prefix prepended to every revocation key.
    pub key_prefix: String,
}

impl Default for RedisRevocationConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            pool_size: 16,
            timeout: Duration::from_secs(2),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}
