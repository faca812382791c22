//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{de::IgnoredAny, Serialize};
use utoipa::ToSchema;

use crate::{
    backend::{CacheMode, ErrorKind, RequestOptions},
    AppState,
};

const BACKEND_HEALTH_PATH: &str = "/health";

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
    /// Whether the library backend answered, on readiness checks only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: None,
    })
}

/// Readiness check endpoint (checks the library backend is reachable)
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Backend unreachable", body = HealthResponse)
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let probe = state
        .backend
        .get::<Option<IgnoredAny>>(BACKEND_HEALTH_PATH, RequestOptions::new().cache(CacheMode::NoStore))
        .await;

    // Any HTTP answer proves the backend is up
    let (status, backend) = match probe {
        Err(e) if e.kind() == ErrorKind::NetworkFailure => {
            tracing::warn!("Backend not reachable: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
        _ => (StatusCode::OK, "reachable"),
    };

    (
        status,
        Json(HealthResponse {
            status: if status.is_success() { "ready" } else { "not-ready" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            backend: Some(backend.to_string()),
        }),
    )
}
