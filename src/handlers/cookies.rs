//! Cookie Issuer
//!
//! Hands the browser the session and CSRF cookies. Both values come from
//! configuration, so every call returns the same pair.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;

use crate::config::AppState;
use crate::metrics;
use crate::middleware::TOKEN_COOKIE_NAME;
use crate::models::IssueCookiesResponse;

/// Cookie carrying the CSRF token. Readable by page scripts.
pub const CSRF_COOKIE_NAME: &str = "csrf-token";

/// Build the `token` cookie: HttpOnly, not Secure.
pub fn session_cookie(state: &AppState) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE_NAME, state.config.auth.session_token.clone()))
        .path("/")
        .http_only(true)
        .expires(state.cookie_expiry.session)
        .build()
}

/// Build the `csrf-token` cookie: Secure, not HttpOnly.
pub fn csrf_cookie(state: &AppState) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE_NAME, state.config.auth.csrf_token.clone()))
        .path("/")
        .secure(true)
        .expires(state.cookie_expiry.csrf)
        .build()
}

/// Issue the session and CSRF cookies
///
/// GET /api/set-cookies
///
/// Never fails. Unset token values produce cookies with empty values.
pub async fn issue_cookies(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<IssueCookiesResponse>) {
    metrics::record_cookies_issued();
    tracing::debug!(
        session_token_set = !state.config.auth.session_token.is_empty(),
        csrf_token_set = !state.config.auth.csrf_token.is_empty(),
        "Issuing session cookies"
    );

    let jar = jar.add(session_cookie(&state)).add(csrf_cookie(&state));

    (jar, Json(IssueCookiesResponse { success: true }))
}
