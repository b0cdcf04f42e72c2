//! Dashboard Frontend Client
//!
//! Forwards requests that passed the route guard to the dashboard frontend,
//! preserving method, path, query, body and end-to-end headers. The
//! `Authorization` header set by the guard travels with them.

use axum::{
    body::Body,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::Response,
};
use bytes::Bytes;
use std::sync::Arc;

use crate::config::AppState;
use crate::error::{AppError, AppResult};
use crate::metrics;

/// Maximum request body forwarded to the frontend (10MB)
pub const MAX_REQUEST_BODY: usize = 10 * 1024 * 1024;

/// Headers that describe a single hop and are never forwarded
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_forwardable(name: &str, skip_length: bool) -> bool {
    !HOP_BY_HOP.contains(&name) && name != "host" && !(skip_length && name == "content-length")
}

/// Copy end-to-end headers from `source`
pub fn forwardable_headers(source: &HeaderMap, skip_length: bool) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(source.len());
    for (name, value) in source.iter() {
        if is_forwardable(name.as_str(), skip_length) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Client for the dashboard frontend
pub struct FrontendClient {
    state: Arc<AppState>,
}

impl FrontendClient {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    fn base_url(&self) -> AppResult<&str> {
        self.state
            .config
            .upstream
            .url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .ok_or_else(|| AppError::NotFound("No dashboard frontend is configured".into()))
    }

    /// Full upstream URL for a request URI
    pub fn upstream_url(&self, uri: &Uri) -> AppResult<String> {
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Ok(format!("{}{}", self.base_url()?, path_and_query))
    }

    /// Forward a request and stream the frontend's response back
    pub async fn forward(
        &self,
        method: Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: Bytes,
    ) -> AppResult<Response> {
        let url = self.upstream_url(uri)?;
        let body_size = body.len();

        tracing::debug!(
            url = %url,
            method = %method,
            body_size = body_size,
            "Forwarding to dashboard frontend"
        );

        let mut request = self
            .state
            .http_client
            .request(method.clone(), &url)
            .headers(forwardable_headers(headers, true));

        if !body.is_empty() {
            request = request.body(body);
        }

        let start = std::time::Instant::now();
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    url = %url,
                    error = %e,
                    is_timeout = e.is_timeout(),
                    is_connect = e.is_connect(),
                    "Dashboard frontend request failed"
                );
                metrics::record_proxy_request(
                    method.as_str(),
                    StatusCode::BAD_GATEWAY.as_u16(),
                    start.elapsed().as_secs_f64(),
                );
                if e.is_timeout() {
                    return Err(AppError::Upstream {
                        status: StatusCode::GATEWAY_TIMEOUT.as_u16(),
                        message: "The dashboard frontend did not respond in time".to_string(),
                    });
                }
                return Err(e.into());
            }
        };

        let status = response.status();
        metrics::record_proxy_request(
            method.as_str(),
            status.as_u16(),
            start.elapsed().as_secs_f64(),
        );

        let mut builder = Response::builder().status(status);
        if let Some(response_headers) = builder.headers_mut() {
            *response_headers = forwardable_headers(response.headers(), false);
        }

        builder
            .body(Body::from_stream(response.bytes_stream()))
            .map_err(|e| AppError::Internal(format!("Failed to build frontend response: {e}")))
    }
}
