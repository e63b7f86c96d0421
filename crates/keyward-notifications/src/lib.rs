//! Out-of-band delivery of Keyward session notices.
//!
//! [`WebhookNotifier`] posts each notice as JSON to a configured URL and
//! implements [`SessionNotifier`](keyward_auth::notify::SessionNotifier), so
//! it plugs straight into the session service.

pub mod config;
pub mod error;
pub mod webhook;

pub use config::WebhookConfig;
pub use error::NotificationError;
pub use webhook::{SIGNATURE_HEADER, WebhookNotifier};
