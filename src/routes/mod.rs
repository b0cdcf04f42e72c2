//! Routes
//!
//! Assembles the gateway: Hangar's own endpoints, the dashboard frontend
//! fallback, and the route guard layered over all of them.

pub mod health;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppState;
use crate::handlers::{cookies, frontend};
use crate::metrics;
use crate::middleware::route_guard;

/// Create the router for Hangar's own endpoints
///
/// - /health, /ready, /live - Probes
/// - /metrics - Prometheus metrics
/// - /api/set-cookies - Cookie issuer
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/live", get(health::liveness_check))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/api/set-cookies", get(cookies::issue_cookies))
}

/// Build the complete application
///
/// The guard wraps the fallback as well, so it sees every request and the
/// configured matchers decide which ones it acts on.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router()
        .fallback(frontend::forward_to_frontend)
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors),
        )
        .with_state(state)
}
