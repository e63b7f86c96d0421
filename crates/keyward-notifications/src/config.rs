//! Webhook settings.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how address change notices are delivered.
///
/// With no `webhook_url` the server falls back to dropping notices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Receiver URL.
    pub webhook_url: Option<String>,

    /// Shared secret for the `X-Signature-256` HMAC header.
    pub webhook_secret: Option<String>,

    /// Extra headers sent with every delivery.
    pub webhook_headers: HashMap<String, String>,

    /// Per-delivery timeout.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_secret: None,
            webhook_headers: HashMap::new(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl WebhookConfig {
    /// Returns `true` if a receiver URL is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.webhook_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}
