//! Client fingerprint captured at login and compared on refresh.

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;

/// Client metadata a session is bound to.
///
/// A changed `user_agent` on refresh is treated as hijacking and kills the
/// session. A changed `source_ip` only triggers a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Client's self-reported software identifier.
    pub user_agent: String,

    /// Network address the request originated from.
    pub source_ip: String,
}

impl Fingerprint {
    /// Creates a fingerprint, rejecting blank values.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidArgument` if either value is empty or
    /// whitespace only.
    pub fn new(user_agent: impl Into<String>, source_ip: impl Into<String>) -> AuthResult<Self> {
        let user_agent = user_agent.into();
        let source_ip = source_ip.into();

        if user_agent.trim().is_empty() {
            return Err(AuthError::invalid_argument("user-agent not provided"));
        }
        if source_ip.trim().is_empty() {
            return Err(AuthError::invalid_argument("source address not provided"));
        }

        Ok(Self {
            user_agent,
            source_ip,
        })
    }

    /// Builds a fingerprint from optional request metadata.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidArgument` if either part is absent or blank.
    pub fn from_parts(user_agent: Option<&str>, source_ip: Option<&str>) -> AuthResult<Self> {
        Self::new(user_agent.unwrap_or_default(), source_ip.unwrap_or_default())
    }
}
