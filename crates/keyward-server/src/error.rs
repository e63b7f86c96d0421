//! HTTP error responses.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use keyward_auth::AuthError;
use serde_json::json;

/// Challenge sent with every 401.
const BEARER_CHALLENGE: &str = r#"Bearer error="invalid_token""#;

/// An [`AuthError`] on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AuthError::NotFound { .. } => StatusCode::NOT_FOUND,
            AuthError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            AuthError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            AuthError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Storage { .. } | AuthError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "internal server error"
        } else {
            tracing::debug!(error = %self.0, category = %self.0.category(), "request rejected");
            self.0.message()
        };

        let body = json!({
            "error": self.0.code(),
            "message": message,
        });

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(BEARER_CHALLENGE),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::not_found("x"), StatusCode::NOT_FOUND),
            (AuthError::invalid_argument("x"), StatusCode::BAD_REQUEST),
            (AuthError::unauthenticated("x"), StatusCode::UNAUTHORIZED),
            (AuthError::unavailable("x"), StatusCode::SERVICE_UNAVAILABLE),
            (AuthError::storage("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = ApiError(AuthError::unauthenticated("token is revoked")).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            BEARER_CHALLENGE
        );
    }

    #[test]
    fn test_internal_has_no_challenge() {
        let response = ApiError(AuthError::storage("pg: relation missing")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
