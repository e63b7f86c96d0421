use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use keyward_auth::types::TokenPair;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::extract::{Authorization, ClientFingerprint, ClientMetadata, JsonBody};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub guid: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub guid: String,
}

pub async fn healthz() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// `POST /v1/users`
pub async fn register(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<IdentityResponse>), ApiError> {
    let guid = state.service.register().await?;
    Ok((StatusCode::CREATED, Json(IdentityResponse { guid })))
}

/// `POST /v1/tokens`
///
/// An unknown `guid` is reported before missing client metadata.
pub async fn issue(
    State(state): State<AppState>,
    client: ClientMetadata,
    JsonBody(body): JsonBody<IssueRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair = state
        .service
        .issue_for_client(
            &body.guid,
            client.user_agent.as_deref(),
            client.source_ip.as_deref(),
        )
        .await?;
    Ok(Json(pair))
}

/// `POST /v1/tokens/refresh`
pub async fn refresh(
    State(state): State<AppState>,
    Authorization(authorization): Authorization,
    ClientFingerprint(fingerprint): ClientFingerprint,
    JsonBody(body): JsonBody<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair = state
        .service
        .rotate(&authorization, &body.refresh, &fingerprint)
        .await?;
    Ok(Json(pair))
}

/// `GET /v1/identity`
pub async fn identity(
    State(state): State<AppState>,
    Authorization(authorization): Authorization,
) -> Result<Json<IdentityResponse>, ApiError> {
    let guid = state.service.identify(&authorization).await?;
    Ok(Json(IdentityResponse { guid }))
}

/// `POST /v1/logout`
pub async fn logout(
    State(state): State<AppState>,
    Authorization(authorization): Authorization,
) -> Result<StatusCode, ApiError> {
    state.service.revoke(&authorization).await?;
    Ok(StatusCode::NO_CONTENT)
}
