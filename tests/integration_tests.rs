//! Integration tests for the Hangar gateway
//!
//! These tests verify Hangar's own endpoints work correctly.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use axum_test::TestServer;
use hangar::{HealthResponse, IssueCookiesResponse};
use serde_json::Value;
use tower::ServiceExt;

use common::{get, test_app, test_config, CSRF_TOKEN, SESSION_TOKEN};

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn find_cookie<'a>(cookies: &'a [String], name: &str) -> &'a str {
    cookies
        .iter()
        .find(|c| c.starts_with(&format!("{name}=")))
        .unwrap_or_else(|| panic!("missing {name} cookie in {cookies:?}"))
}

#[tokio::test]
async fn test_liveness_check() {
    let server = TestServer::new(test_app(test_config())).unwrap();

    let response = server.get("/live").await;
    response.assert_status_ok();
    response.assert_text("alive");
}

#[tokio::test]
async fn test_readiness_check() {
    let server = TestServer::new(test_app(test_config())).unwrap();

    let response = server.get("/ready").await;
    response.assert_status_ok();
    response.assert_text("ready");
}

#[tokio::test]
async fn test_health_reports_upstream() {
    let server = TestServer::new(test_app(test_config())).unwrap();

    let health: HealthResponse = server.get("/health").await.json();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert!(!health.upstream_configured);
}

#[tokio::test]
async fn test_issue_cookies_body() {
    let server = TestServer::new(test_app(test_config())).unwrap();

    let response = server.get("/api/set-cookies").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<IssueCookiesResponse>(),
        IssueCookiesResponse { success: true }
    );
}

#[tokio::test]
async fn test_issue_cookies_sets_exactly_two_cookies() {
    let response = test_app(test_config())
        .oneshot(get("/api/set-cookies"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2, "{cookies:?}");

    let token = find_cookie(&cookies, "token");
    assert!(token.starts_with(&format!("token={SESSION_TOKEN};")));
    assert!(token.contains("HttpOnly"));
    assert!(!token.contains("Secure"));
    assert!(token.contains("Path=/"));
    assert!(token.contains("Expires=Thu, 24 Apr 2025 04:33:25 GMT"));

    let csrf = find_cookie(&cookies, "csrf-token");
    assert!(csrf.starts_with(&format!("csrf-token={CSRF_TOKEN};")));
    assert!(csrf.contains("Secure"));
    assert!(!csrf.contains("HttpOnly"));
    assert!(csrf.contains("Path=/"));
    assert!(csrf.contains("Expires=Fri, 18 Apr 2025 01:45:53 GMT"));
}

#[tokio::test]
async fn test_issue_cookies_ignores_request_state() {
    let request = Request::builder()
        .uri("/api/set-cookies")
        .header(header::COOKIE, "token=stale; csrf-token=stale; theme=dark")
        .header(header::AUTHORIZATION, "Bearer someone-else")
        .body(Body::empty())
        .unwrap();

    let response = test_app(test_config()).oneshot(request).await.unwrap();

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2, "{cookies:?}");
    assert!(find_cookie(&cookies, "token").starts_with(&format!("token={SESSION_TOKEN};")));
    assert!(find_cookie(&cookies, "csrf-token").starts_with(&format!("csrf-token={CSRF_TOKEN};")));
}

#[tokio::test]
async fn test_issue_cookies_with_unset_tokens() {
    let response = test_app(hangar::AppConfig::default())
        .oneshot(get("/api/set-cookies"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(find_cookie(&cookies, "token").starts_with("token=;"));
    assert!(find_cookie(&cookies, "csrf-token").starts_with("csrf-token=;"));
}

#[tokio::test]
async fn test_metrics_exposes_counters() {
    let app = test_app(test_config());
    app.clone().oneshot(get("/api/set-cookies")).await.unwrap();
    app.clone().oneshot(get("/dashboard")).await.unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("hangar_cookies_issued_total"));
    assert!(text.contains("hangar_guard_decisions_total{outcome=\"redirect\"}"));
}

#[tokio::test]
async fn test_unknown_route_without_frontend_is_not_found() {
    let response = test_app(test_config()).oneshot(get("/about")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "not_found");
}
