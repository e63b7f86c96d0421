//! # keyward-auth
//!
//! Session and token lifecycle for Keyward.
//!
//! This crate provides:
//! - HS512 access token issuance and verification
//! - Opaque refresh secrets stored only as Argon2id hashes
//! - Single-use refresh rotation with client fingerprint checks
//! - A time-bounded denylist of revoked access tokens
//! - In-memory storage backends
//!
//! Transport, configuration loading, notification delivery, and persistent
//! storage engines live in sibling crates and plug in through the traits in
//! [`storage`] and [`notify`].
//!
//! ## Modules
//!
//! - [`config`] - Token and session configuration
//! - [`error`] - Error types
//! - [`notify`] - Address change notices
//! - [`secret`] - Refresh secret hashing
//! - [`service`] - The [`SessionService`] policy layer
//! - [`storage`] - Storage traits and in-memory backends
//! - [`token`] - Access token codec and refresh secret generation
//! - [`types`] - Sessions, fingerprints, token pairs

pub mod config;
pub mod error;
pub mod notify;
pub mod secret;
pub mod service;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, ErrorCategory};
pub use service::SessionService;

/// Result type for session and token operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use keyward_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::notify::{AddressChangeNotice, NoopNotifier, SessionNotifier};
    pub use crate::service::SessionService;
    pub use crate::storage::{
        IdentityStorage, InMemoryIdentityStorage, InMemoryRevokedTokenStorage,
        InMemorySessionStorage, RevokedTokenStorage, SessionStorage,
    };
    pub use crate::token::{AccessClaims, JwtError, RefreshSecretGenerator, TokenCodec};
    pub use crate::types::{Fingerprint, NewSession, Session, SessionId, TokenPair};
}
