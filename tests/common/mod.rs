//! Shared helpers for integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use hangar::{routes, AppConfig, AppState};
use std::sync::Arc;

pub const SESSION_TOKEN: &str = "session-abc";
pub const CSRF_TOKEN: &str = "csrf-xyz";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.session_token = SESSION_TOKEN.to_string();
    config.auth.csrf_token = CSRF_TOKEN.to_string();
    config
}

pub fn test_state(config: AppConfig) -> Arc<AppState> {
    Arc::new(AppState::new(config).expect("test config is valid"))
}

pub fn test_app(config: AppConfig) -> Router {
    routes::app(test_state(config))
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

pub fn get_with(path: &str, cookie: Option<&str>, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if let Some(authorization) = authorization {
        builder = builder.header(header::AUTHORIZATION, authorization);
    }
    builder.body(Body::empty()).unwrap()
}
