//! Out-of-band notifications about suspicious session activity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::types::SessionId;

/// Message sent when a session is refreshed from a different address.
pub const ADDRESS_CHANGE_MESSAGE: &str = "session refreshed from a different address";

/// Payload describing a refresh from an unexpected address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressChangeNotice {
    /// Human-readable description.
    pub message: String,

    /// Address recorded when the session started.
    pub old_ip: String,

    /// Address the refresh came from.
    pub new_ip: String,

    /// Identity that owns the session.
    pub identity: String,

    /// Session that was refreshed.
    pub session_id: SessionId,
}

impl AddressChangeNotice {
    /// Creates a notice with the standard message.
    #[must_use]
    pub fn new(
        identity: impl Into<String>,
        session_id: SessionId,
        old_ip: impl Into<String>,
        new_ip: impl Into<String>,
    ) -> Self {
        Self {
            message: ADDRESS_CHANGE_MESSAGE.to_string(),
            old_ip: old_ip.into(),
            new_ip: new_ip.into(),
            identity: identity.into(),
            session_id,
        }
    }
}

/// Delivers session notices to an external party.
///
/// Delivery is best effort. The session service dispatches notices on a
/// background task and only logs failures.
#[async_trait]
pub trait SessionNotifier: Send + Sync {
    /// Delivers an address change notice.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    async fn notify_address_change(&self, notice: &AddressChangeNotice) -> AuthResult<()>;
}

/// Notifier that drops every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl SessionNotifier for NoopNotifier {
    async fn notify_address_change(&self, notice: &AddressChangeNotice) -> AuthResult<()> {
        tracing::debug!(
            identity = %notice.identity,
            session_id = notice.session_id,
            "address change notice dropped, no notifier configured"
        );
        Ok(())
    }
}
