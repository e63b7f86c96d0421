//! Session and token lifecycle error types.
//!
//! Every operation exposed by [`SessionService`](crate::service::SessionService)
//! fails with one of the kinds defined here. Messages are safe to show to
//! callers: storage and codec details are logged at the point of failure and
//! replaced with a generic description before they reach this type.

use std::fmt;

/// Errors that can occur during session and token operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The referenced identity does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what was not found.
        message: String,
    },

    /// Required request data (such as fingerprint metadata) is missing or blank.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// The presented credentials are bad, expired, revoked, or no longer bound
    /// to a live session.
    #[error("Unauthenticated: {message}")]
    Unauthenticated {
        /// Description of why authentication failed.
        message: String,
    },

    /// A collaborator needed to confirm safety is unreachable.
    ///
    /// Used for revocation lookups: when the denylist cannot be consulted the
    /// token is rejected rather than trusted.
    #[error("Unavailable: {message}")]
    Unavailable {
        /// Description of the unavailable dependency.
        message: String,
    },

    /// An error occurred while storing or retrieving session data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An unexpected internal error occurred (codec, entropy, hashing).
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidArgument` error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthenticated` error.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::InvalidArgument { .. } | Self::Unauthenticated { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Storage { .. } | Self::Internal { .. }
        )
    }

    /// Returns `true` if the caller must re-authenticate.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }

    /// Returns the caller-safe message carried by this error.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message }
            | Self::InvalidArgument { message }
            | Self::Unauthenticated { message }
            | Self::Unavailable { message }
            | Self::Storage { message }
            | Self::Internal { message } => message,
        }
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::Validation,
            Self::InvalidArgument { .. } => ErrorCategory::Validation,
            Self::Unauthenticated { .. } => ErrorCategory::Authentication,
            Self::Unavailable { .. } => ErrorCategory::Infrastructure,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the stable, transport-independent code for this error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Unavailable { .. } => "unavailable",
            Self::Storage { .. } | Self::Internal { .. } => "internal",
        }
    }
}

/// Categories of errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential verification failures.
    Authentication,
    /// Request validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
