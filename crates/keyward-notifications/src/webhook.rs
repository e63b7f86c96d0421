use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;

use keyward_auth::notify::{AddressChangeNotice, SessionNotifier};
use keyward_auth::{AuthError, AuthResult};

use crate::config::WebhookConfig;
use crate::error::NotificationError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying `sha256=<hex>` of the request body.
pub const SIGNATURE_HEADER: &str = "X-Signature-256";

/// Posts session notices to a webhook.
pub struct WebhookNotifier {
    http_client: Client,
    url: String,
    secret: Option<String>,
    headers: Vec<(String, String)>,
}

impl WebhookNotifier {
    /// Builds a notifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::InvalidConfig` if no URL is configured or
    /// the HTTP client cannot be built.
    pub fn new(config: &WebhookConfig) -> Result<Self, NotificationError> {
        let url = config
            .webhook_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| NotificationError::InvalidConfig("Missing webhook_url".into()))?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotificationError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http_client,
            url,
            secret: config.webhook_secret.clone(),
            headers: config
                .webhook_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
    }

    /// Delivers one notice and waits for the receiver's answer.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::SendFailed` on transport failure and
    /// `NotificationError::Rejected` on a non-2xx response.
    pub async fn deliver(&self, notice: &AddressChangeNotice) -> Result<(), NotificationError> {
        let payload = serde_json::to_string(notice)
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

        let mut request = self
            .http_client
            .post(&self.url)
            .header("Content-Type", "application/json");

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        if let Some(secret) = &self.secret {
            let signature = sign_payload(&payload, secret)?;
            request = request.header(SIGNATURE_HEADER, format!("sha256={signature}"));
        }

        let response = request
            .body(payload)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(
                identity = %notice.identity,
                session_id = notice.session_id,
                "address change notice delivered"
            );
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Hex HMAC-SHA256 of `payload` under `secret`.
fn sign_payload(payload: &str, secret: &str) -> Result<String, NotificationError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| NotificationError::InvalidConfig(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl SessionNotifier for WebhookNotifier {
    async fn notify_address_change(&self, notice: &AddressChangeNotice) -> AuthResult<()> {
        self.deliver(notice)
            .await
            .map_err(|e| AuthError::unavailable(e.to_string()))
    }
}
