use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

use crate::config::DEFAULT_METRICS_AUTH;
use crate::metrics;
use crate::services::AppState;

pub mod sessions;
pub mod videos;

const STATUS_PAGE: &str = include_str!("../../static/status.html");

/// Always 200; a failing dependency shows up as `degraded` in the body.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health.check_health().await;
    (StatusCode::OK, Json(health))
}

/// Landing page that polls `/health`
pub async fn status_page() -> Html<&'static str> {
    Html(STATUS_PAGE)
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

/// Protects /metrics with HTTP Basic Auth (`METRICS_AUTH=user:password`).
/// Production startup refuses to run without explicit credentials.
pub async fn metrics_auth_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let credentials = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(|encoded| general_purpose::STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let expected = std::env::var("METRICS_AUTH").unwrap_or_else(|_| DEFAULT_METRICS_AUTH.to_string());

    if credentials != expected {
        tracing::warn!("Rejected /metrics request with invalid credentials");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}
