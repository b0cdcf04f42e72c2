//! Dashboard Frontend Handler
//!
//! Fallback for every path Hangar does not serve itself. Guarded paths reach
//! it only after the route guard has let them through.

use axum::{
    body::Body,
    extract::{Request, State},
    response::Response,
};
use std::sync::Arc;

use crate::config::AppState;
use crate::error::{AppError, AppResult};
use crate::services::{FrontendClient, MAX_REQUEST_BODY};

/// Forward a request to the dashboard frontend
pub async fn forward_to_frontend(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
) -> AppResult<Response> {
    let (parts, body) = req.into_parts();

    let body_bytes = axum::body::to_bytes(body, MAX_REQUEST_BODY)
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read body: {}", e)))?;

    FrontendClient::new(state)
        .forward(parts.method, &parts.uri, &parts.headers, body_bytes)
        .await
}
