//! Session and token lifecycle.
//!
//! [`SessionService`] owns the security policy: issuing credential pairs,
//! single-use refresh rotation with hijack detection, access token
//! revocation, and identity lookup. It holds only shared, read-only
//! collaborators and is cheap to clone into request handlers.
//!
//! # Rotation
//!
//! A refresh is accepted only if the presented access token is not revoked,
//! carries a valid signature (its expiry is ignored), and points at a live
//! session of a live identity whose refresh hash matches. A changed
//! user-agent kills the session. A changed source address is reported to the
//! notifier and otherwise tolerated.
//!
//! Old credentials are always invalidated before new ones are minted, so a
//! failure part way through never leaves two usable pairs behind.

use std::fmt::Display;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::notify::{AddressChangeNotice, NoopNotifier, SessionNotifier};
use crate::secret::{hash_refresh_secret, verify_refresh_secret};
use crate::storage::{IdentityStorage, RevokedTokenStorage, SessionStorage};
use crate::token::{AccessClaims, JwtError, RefreshSecretGenerator, TokenCodec, strip_bearer};
use crate::types::{Fingerprint, NewSession, Session, TokenPair};

/// Issues, rotates, and revokes credential pairs.
#[derive(Clone)]
pub struct SessionService {
    codec: Arc<TokenCodec>,
    refresh: RefreshSecretGenerator,
    identities: Arc<dyn IdentityStorage>,
    sessions: Arc<dyn SessionStorage>,
    revoked: Arc<dyn RevokedTokenStorage>,
    notifier: Arc<dyn SessionNotifier>,
}

impl SessionService {
    /// Creates a service that drops address change notices.
    pub fn new(
        codec: Arc<TokenCodec>,
        refresh: RefreshSecretGenerator,
        identities: Arc<dyn IdentityStorage>,
        sessions: Arc<dyn SessionStorage>,
        revoked: Arc<dyn RevokedTokenStorage>,
    ) -> Self {
        Self {
            codec,
            refresh,
            identities,
            sessions,
            revoked,
            notifier: Arc::new(NoopNotifier),
        }
    }

    /// Creates a service from validated configuration.
    pub fn from_config(
        config: &AuthConfig,
        identities: Arc<dyn IdentityStorage>,
        sessions: Arc<dyn SessionStorage>,
        revoked: Arc<dyn RevokedTokenStorage>,
    ) -> Self {
        Self::new(
            Arc::new(TokenCodec::from_config(config)),
            RefreshSecretGenerator::from_config(config),
            identities,
            sessions,
            revoked,
        )
    }

    /// Replaces the notifier used for address change notices.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn SessionNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Returns the token codec.
    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Creates a new identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the identity cannot be stored.
    pub async fn register(&self) -> AuthResult<String> {
        let identity = self
            .identities
            .create()
            .await
            .map_err(internal("failed to register identity"))?;
        info!(identity = %identity, "identity registered");
        Ok(identity)
    }

    /// Starts a session for an existing identity.
    ///
    /// # Errors
    ///
    /// - `AuthError::NotFound` if the identity does not exist
    /// - `AuthError::Internal` on storage, hashing, or signing failure
    pub async fn issue(&self, identity: &str, fingerprint: &Fingerprint) -> AuthResult<TokenPair> {
        self.require_identity(identity).await?;
        self.start_session(identity, fingerprint).await
    }

    /// Starts a session from raw client metadata.
    ///
    /// The identity is checked before the metadata, so an unknown identity
    /// is reported as such even when the metadata is incomplete.
    ///
    /// # Errors
    ///
    /// - `AuthError::NotFound` if the identity does not exist
    /// - `AuthError::InvalidArgument` if user-agent or source address is missing
    /// - `AuthError::Internal` on storage, hashing, or signing failure
    pub async fn issue_for_client(
        &self,
        identity: &str,
        user_agent: Option<&str>,
        source_ip: Option<&str>,
    ) -> AuthResult<TokenPair> {
        self.require_identity(identity).await?;
        let fingerprint = Fingerprint::from_parts(user_agent, source_ip)?;
        self.start_session(identity, &fingerprint).await
    }

    /// Exchanges an access token and refresh secret for a new pair.
    ///
    /// `authorization` is the full `Bearer <token>` value.
    ///
    /// # Errors
    ///
    /// - `AuthError::Unauthenticated` if any credential check fails
    /// - `AuthError::Unavailable` if revocation status cannot be confirmed
    /// - `AuthError::Internal` on storage, hashing, or signing failure
    pub async fn rotate(
        &self,
        authorization: &str,
        refresh: &str,
        fingerprint: &Fingerprint,
    ) -> AuthResult<TokenPair> {
        let access = bearer_token(authorization)?;
        self.ensure_not_revoked(access).await?;

        let claims = self.codec.verify(access, false).map_err(rejected_token)?;

        if !self.identity_exists(&claims.sub).await? {
            warn!(identity = %claims.sub, "refresh for unknown identity");
            return Err(AuthError::unauthenticated("identity not found"));
        }

        let session = self
            .sessions
            .find(&claims.sub, claims.sid)
            .await
            .map_err(internal("failed to load session"))?
            .ok_or_else(|| AuthError::unauthenticated("session not found"))?;

        if session.is_expired() {
            self.delete_session(&session).await?;
            info!(identity = %session.identity, session_id = session.id, "expired session removed on refresh");
            return Err(AuthError::unauthenticated("session expired"));
        }

        if session.fingerprint.user_agent != fingerprint.user_agent {
            warn!(
                identity = %session.identity,
                session_id = session.id,
                "user-agent changed on refresh, invalidating session"
            );
            self.revoke_access(access, &claims).await?;
            self.delete_session(&session).await?;
            return Err(AuthError::unauthenticated("session invalidated"));
        }

        if session.fingerprint.source_ip != fingerprint.source_ip {
            self.dispatch_address_change(&session, &fingerprint.source_ip);
        }

        let matches = verify_refresh_secret(refresh, &session.refresh_hash).map_err(|e| {
            error!(error = %e, session_id = session.id, "stored refresh hash is unreadable");
            AuthError::internal("failed to verify refresh secret")
        })?;
        if !matches {
            debug!(identity = %session.identity, session_id = session.id, "refresh secret mismatch");
            return Err(AuthError::unauthenticated("refresh invalid"));
        }

        self.revoke_access(access, &claims).await?;
        let consumed = self
            .sessions
            .consume(&session.identity, session.id, &session.refresh_hash)
            .await
            .map_err(internal("failed to consume session"))?;
        if !consumed {
            warn!(
                identity = %session.identity,
                session_id = session.id,
                "session already rotated by a concurrent request"
            );
            return Err(AuthError::unauthenticated("session not found"));
        }

        let pair = self.start_session(&session.identity, fingerprint).await?;
        info!(identity = %session.identity, old_session_id = session.id, "session rotated");
        Ok(pair)
    }

    /// Returns the identity behind a live, unexpired access token.
    ///
    /// # Errors
    ///
    /// - `AuthError::Unauthenticated` if the token is revoked, expired, or invalid
    /// - `AuthError::Unavailable` if revocation status cannot be confirmed
    pub async fn identify(&self, authorization: &str) -> AuthResult<String> {
        let access = bearer_token(authorization)?;
        self.ensure_not_revoked(access).await?;
        let claims = self.codec.verify(access, true).map_err(rejected_token)?;
        Ok(claims.sub)
    }

    /// Logs out: revokes the access token and deletes its session.
    ///
    /// # Errors
    ///
    /// - `AuthError::Unauthenticated` if the token is revoked, expired, or invalid
    /// - `AuthError::Unavailable` if revocation status cannot be confirmed
    /// - `AuthError::Internal` on storage failure
    pub async fn revoke(&self, authorization: &str) -> AuthResult<()> {
        let access = bearer_token(authorization)?;
        self.ensure_not_revoked(access).await?;
        let claims = self.codec.verify(access, true).map_err(rejected_token)?;

        self.revoke_access(access, &claims).await?;
        self.sessions
            .delete(&claims.sub, claims.sid)
            .await
            .map_err(internal("failed to delete session"))?;

        info!(identity = %claims.sub, session_id = claims.sid, "session revoked");
        Ok(())
    }

    /// Deletes sessions past their refresh lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the cleanup fails.
    pub async fn cleanup_expired_sessions(&self) -> AuthResult<u64> {
        self.sessions
            .cleanup_expired()
            .await
            .map_err(internal("failed to clean up expired sessions"))
    }

    // ------------------------------------------------------------------------
    // Steps
    // ------------------------------------------------------------------------

    async fn identity_exists(&self, identity: &str) -> AuthResult<bool> {
        self.identities
            .exists(identity)
            .await
            .map_err(internal("failed to look up identity"))
    }

    async fn require_identity(&self, identity: &str) -> AuthResult<()> {
        if self.identity_exists(identity).await? {
            Ok(())
        } else {
            debug!(identity = %identity, "issue refused for unknown identity");
            Err(AuthError::not_found("identity not found"))
        }
    }

    async fn ensure_not_revoked(&self, access: &str) -> AuthResult<()> {
        match self.revoked.is_revoked(access).await {
            Ok(false) => Ok(()),
            Ok(true) => Err(AuthError::unauthenticated("token is revoked")),
            Err(e) => {
                error!(error = %e, "revocation lookup failed, rejecting token");
                Err(AuthError::unavailable("cannot confirm token status"))
            }
        }
    }

    async fn revoke_access(&self, access: &str, claims: &AccessClaims) -> AuthResult<()> {
        self.revoked
            .revoke(access, claims.expires_at())
            .await
            .map_err(internal("failed to revoke access token"))
    }

    async fn delete_session(&self, session: &Session) -> AuthResult<()> {
        self.sessions
            .delete(&session.identity, session.id)
            .await
            .map_err(internal("failed to delete session"))
    }

    async fn start_session(
        &self,
        identity: &str,
        fingerprint: &Fingerprint,
    ) -> AuthResult<TokenPair> {
        let refresh = self.refresh.generate()?;
        let refresh_hash = hash_refresh_secret(&refresh).map_err(|e| {
            error!(error = %e, "refresh secret hashing failed");
            AuthError::internal("failed to hash refresh secret")
        })?;

        let expires_at = time::Duration::try_from(self.refresh.lifetime())
            .ok()
            .and_then(|lifetime| OffsetDateTime::now_utc().checked_add(lifetime))
            .ok_or_else(|| {
                error!(lifetime = ?self.refresh.lifetime(), "refresh lifetime out of range");
                AuthError::internal("failed to compute session expiry")
            })?;

        let session_id = self
            .sessions
            .create(NewSession {
                identity: identity.to_string(),
                refresh_hash,
                fingerprint: fingerprint.clone(),
                expires_at,
            })
            .await
            .map_err(internal("failed to create session"))?;

        let access = match self.codec.issue(
            identity,
            session_id,
            self.codec.access_token_lifetime(),
        ) {
            Ok(access) => access,
            Err(e) => {
                error!(error = %e, session_id, "access token signing failed");
                // Nobody holds a token for this session, drop it.
                if let Err(e) = self.sessions.delete(identity, session_id).await {
                    warn!(error = %e, session_id, "failed to drop unusable session");
                }
                return Err(AuthError::internal("failed to issue access token"));
            }
        };

        info!(identity = %identity, session_id, "session started");
        Ok(TokenPair { access, refresh })
    }

    fn dispatch_address_change(&self, session: &Session, new_ip: &str) {
        let notice = AddressChangeNotice::new(
            session.identity.clone(),
            session.id,
            session.fingerprint.source_ip.clone(),
            new_ip,
        );
        info!(
            identity = %notice.identity,
            session_id = notice.session_id,
            old_ip = %notice.old_ip,
            new_ip = %notice.new_ip,
            "refresh from a different address"
        );

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_address_change(&notice).await {
                warn!(
                    error = %e,
                    identity = %notice.identity,
                    session_id = notice.session_id,
                    "address change notification failed"
                );
            }
        });
    }
}

fn bearer_token(authorization: &str) -> AuthResult<&str> {
    strip_bearer(authorization)
        .map_err(|_| AuthError::unauthenticated("invalid authorization format"))
}

fn rejected_token(err: JwtError) -> AuthError {
    debug!(error = %err, "access token rejected");
    match err {
        JwtError::Expired => AuthError::unauthenticated("token expired"),
        _ => AuthError::unauthenticated("invalid token"),
    }
}

/// Logs `err` with its cause and replaces it with a generic internal error.
fn internal<E: Display>(context: &'static str) -> impl FnOnce(E) -> AuthError {
    move |err| {
        error!(error = %err, "{context}");
        AuthError::internal(context)
    }
}

// ============================================================================
// Tests
// ============================================================================
