//! Data types for the Hangar gateway
//!
//! Response bodies produced by Hangar itself. Everything else is rendered by
//! the dashboard frontend.

use serde::{Deserialize, Serialize};

/// Cookie issuer response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueCookiesResponse {
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub upstream_configured: bool,
}
