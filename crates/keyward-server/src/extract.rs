//! Request extractors for credentials and client fingerprints.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts, Request};
use axum::http::{HeaderMap, header, request::Parts};
use keyward_auth::AuthError;
use keyward_auth::types::Fingerprint;

use crate::error::ApiError;

/// Raw `Authorization` header value.
///
/// Only presence is checked here; the session service parses the scheme.
#[derive(Debug, Clone)]
pub struct Authorization(pub String);

impl<S> FromRequestParts<S> for Authorization
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| Self(value.to_string()))
            .ok_or_else(|| ApiError(AuthError::unauthenticated("missing authorization header")))
    }
}

/// `User-Agent` and originating address as sent, possibly missing.
///
/// The address is the first `X-Forwarded-For` entry, else the peer address.
#[derive(Debug, Clone, Default)]
pub struct ClientMetadata {
    pub user_agent: Option<String>,
    pub source_ip: Option<String>,
}

impl ClientMetadata {
    fn from_parts(parts: &Parts) -> Self {
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Self {
            user_agent,
            source_ip: forwarded_for(&parts.headers).or(peer),
        }
    }

    /// Validates the metadata into a fingerprint.
    pub fn fingerprint(&self) -> Result<Fingerprint, AuthError> {
        Fingerprint::from_parts(self.user_agent.as_deref(), self.source_ip.as_deref())
    }
}

impl<S> FromRequestParts<S> for ClientMetadata
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

/// Client fingerprint: `User-Agent` plus the originating address.
#[derive(Debug, Clone)]
pub struct ClientFingerprint(pub Fingerprint);

impl<S> FromRequestParts<S> for ClientFingerprint
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        ClientMetadata::from_parts(parts)
            .fingerprint()
            .map(Self)
            .map_err(ApiError)
    }
}

/// JSON request body whose rejections use the API error format.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            ApiError(AuthError::invalid_argument(format!(
                "invalid request body: {}",
                e.body_text()
            )))
        })?;
        Ok(Self(value))
    }
}

/// First entry of `X-Forwarded-For`: "client, proxy1, proxy2".
pub fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}
