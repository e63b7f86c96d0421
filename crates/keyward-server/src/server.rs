use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use keyward_auth::SessionService;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::KeywardConfig;
use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub service: SessionService,
}

pub fn build_app(service: SessionService, request_timeout: Duration) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/v1/users", post(handlers::register))
        .route("/v1/tokens", post(handlers::issue))
        .route("/v1/tokens/refresh", post(handlers::refresh))
        .route("/v1/identity", get(handlers::identity))
        .route("/v1/logout", post(handlers::logout))
        .with_state(AppState { service })
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
}

async fn handle_middleware_error(err: BoxError) -> impl IntoResponse {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request timed out");
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({"error": "timeout", "message": "request timed out"})),
        )
    } else {
        tracing::error!(error = %err, "middleware error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "internal", "message": "internal server error"})),
        )
    }
}

pub struct KeywardServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    request_timeout: Duration,
}

impl ServerBuilder {
    pub fn new(config: &KeywardConfig) -> Self {
        Self {
            addr: config.addr(),
            request_timeout: config.server.request_timeout,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn build(self, service: SessionService) -> KeywardServer {
        KeywardServer {
            addr: self.addr,
            app: build_app(service, self.request_timeout),
        }
    }
}

impl KeywardServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
