//! Health check routes
//!
//! Provides health and readiness endpoints for the gateway.

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::config::AppState;
use crate::models::HealthResponse;

/// Health check endpoint
///
/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        upstream_configured: state.config.upstream.url.is_some(),
    })
}

/// Readiness check endpoint
///
/// GET /ready
///
/// Hangar keeps no connections of its own, so it is ready once it is serving.
pub async fn readiness_check() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ready")
}

/// Liveness check endpoint
///
/// GET /live
pub async fn liveness_check() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "alive")
}
