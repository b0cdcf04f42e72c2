//! Route Guard Middleware
//!
//! Requires a bearer token on the dashboard sections and normalizes it into a
//! single `Authorization: Bearer <token>` header for the frontend.
//!
//! The token is taken from the `token` cookie or from the `Authorization`
//! header. Its contents are never validated: any non-empty value counts as
//! authenticated.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use super::matcher::{normalize_path, PathMatcher};
use crate::config::AppState;
use crate::metrics;

/// Cookie carrying the session token
pub const TOKEN_COOKIE_NAME: &str = "token";

/// Scheme prefix stripped from, and written back to, the `Authorization` header
pub const BEARER_PREFIX: &str = "Bearer ";

/// The request capabilities the guard needs.
pub trait GuardRequest {
    fn path(&self) -> &str;
    fn cookie(&self, name: &str) -> Option<String>;
    fn header(&self, name: &HeaderName) -> Option<&str>;
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);
    fn remove_header(&mut self, name: &HeaderName);
}

impl<B> GuardRequest for Request<B> {
    fn path(&self) -> &str {
        self.uri().path()
    }

    fn cookie(&self, name: &str) -> Option<String> {
        CookieJar::from_headers(self.headers())
            .get(name)
            .map(|cookie| cookie.value().to_string())
    }

    fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers()
            .get(name)
            .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }

    fn remove_header(&mut self, name: &HeaderName) {
        self.headers_mut().remove(name);
    }
}

/// Strip a leading `Bearer ` from an `Authorization` value.
///
/// Values using any other scheme come back unchanged, so `Token abc` is
/// treated as the token `Token abc`.
pub fn strip_bearer(value: &str) -> &str {
    value.strip_prefix(BEARER_PREFIX).unwrap_or(value)
}

/// Authentication evidence found on a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthEvidence {
    pub cookie_token: Option<String>,
    pub header_token: Option<String>,
}

impl AuthEvidence {
    pub fn from_request<R: GuardRequest + ?Sized>(req: &R) -> Self {
        let cookie_token = req
            .cookie(TOKEN_COOKIE_NAME)
            .filter(|token| !token.is_empty());
        let header_token = req
            .header(&AUTHORIZATION)
            .map(strip_bearer)
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        Self {
            cookie_token,
            header_token,
        }
    }

    /// The token to forward. The cookie wins over the header.
    pub fn token(&self) -> Option<&str> {
        self.cookie_token
            .as_deref()
            .or(self.header_token.as_deref())
    }

    pub fn source(&self) -> &'static str {
        match (&self.cookie_token, &self.header_token) {
            (Some(_), _) => "cookie",
            (None, Some(_)) => "header",
            (None, None) => "none",
        }
    }
}

/// Outcome of guarding one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Stop and send the client to the login page
    Redirect { location: String },
    /// Continue, rewriting `Authorization` when a token was found
    Forward { token: Option<String> },
}

impl GuardDecision {
    pub fn outcome(&self) -> &'static str {
        match self {
            GuardDecision::Redirect { .. } => "redirect",
            GuardDecision::Forward { .. } => "forward",
        }
    }
}

/// Route guard configured with the protected paths and the login page
#[derive(Debug, Clone)]
pub struct RouteGuard {
    matcher: PathMatcher,
    prefixes: Vec<String>,
    login_path: String,
}

impl RouteGuard {
    pub fn new(matcher: PathMatcher, login_path: impl Into<String>) -> Self {
        let prefixes = matcher.prefixes();
        Self {
            matcher,
            prefixes,
            login_path: login_path.into(),
        }
    }

    /// Whether the guard runs at all for this path. Encoded and dotted
    /// spellings of a guarded path (`/%64ashboard`, `/a/../dashboard`) match.
    pub fn applies_to(&self, path: &str) -> bool {
        self.matcher.matches(&normalize_path(path))
    }

    /// Plain prefix test on the normalized path, so `/dashboardx` counts as
    /// protected here even though the matcher never routes it to the guard.
    pub fn is_protected(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Login URL carrying the original path in `from`
    pub fn login_location(&self, from: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("from", from)
            .finish();
        format!("{}?{}", self.login_path, query)
    }

    pub fn evaluate<R: GuardRequest + ?Sized>(&self, req: &R) -> GuardDecision {
        let path = req.path();
        let evidence = AuthEvidence::from_request(req);

        if self.is_protected(path) && evidence.token().is_none() {
            return GuardDecision::Redirect {
                location: self.login_location(path),
            };
        }

        GuardDecision::Forward {
            token: evidence.token().map(str::to_string),
        }
    }
}

/// Set `Authorization: Bearer <token>`, replacing any existing value.
///
/// A token that cannot be carried in a header (a cookie decoding to control
/// characters) still drops the existing value, so a header token never
/// outlives a cookie token.
pub fn authorize<R: GuardRequest + ?Sized>(req: &mut R, token: &str) {
    match HeaderValue::from_str(&format!("{BEARER_PREFIX}{token}")) {
        Ok(value) => req.set_header(AUTHORIZATION, value),
        Err(e) => {
            tracing::warn!("Token is not a valid header value, forwarding without Authorization: {}", e);
            req.remove_header(&AUTHORIZATION);
        }
    }
}

/// Route guard middleware
///
/// Runs on every request but only acts on paths matched by the configured
/// guard patterns. For those it either:
/// 1. Redirects to the login page when no token is present, or
/// 2. Forwards the request with a normalized `Authorization` header
pub async fn route_guard(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if !state.guard.applies_to(req.uri().path()) {
        return next.run(req).await;
    }

    let decision = state.guard.evaluate(&req);
    metrics::record_guard_decision(decision.outcome());

    match decision {
        GuardDecision::Redirect { location } => {
            tracing::debug!(path = %req.uri().path(), "No token on protected path, redirecting to login");
            Redirect::temporary(&location).into_response()
        }
        GuardDecision::Forward { token } => {
            if let Some(token) = token {
                authorize(&mut req, &token);
            }
            tracing::debug!(
                path = %req.uri().path(),
                authorized = req.headers().contains_key(AUTHORIZATION),
                "Forwarding guarded request"
            );
            next.run(req).await
        }
    }
}
