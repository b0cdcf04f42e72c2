//! End-to-end tests of the gateway in front of a mock dashboard frontend.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;
use wiremock::matchers::{body_string, header as header_is, method, path, query_param};
use wiremock::{Mock, MockServer, Request as MockRequest, ResponseTemplate};

use common::{get, get_with, test_app, test_config};

fn app_with_frontend(frontend: &MockServer) -> axum::Router {
    let mut config = test_config();
    config.upstream.url = Some(frontend.uri());
    test_app(config)
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_guarded_request_reaches_frontend_with_bearer() {
    let frontend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instructors/3"))
        .and(query_param("tab", "ratings"))
        .and(header_is("authorization", "Bearer cookie-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<h1>Instructor</h1>"),
        )
        .expect(1)
        .mount(&frontend)
        .await;

    let app = app_with_frontend(&frontend);
    let response = app
        .oneshot(get_with(
            "/instructors/3?tab=ratings",
            Some("token=cookie-token"),
            Some("Bearer header-token"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html"
    );
    assert_eq!(body_text(response).await, "<h1>Instructor</h1>");
}

#[tokio::test]
async fn test_unauthenticated_request_never_reaches_frontend() {
    let frontend = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&frontend)
        .await;

    let app = app_with_frontend(&frontend);
    let response = app.oneshot(get("/aircraft/N172SP")).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login?from=%2Faircraft%2FN172SP"
    );
}

#[tokio::test]
async fn test_public_page_forwarded_without_authorization() {
    let frontend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .expect(1)
        .mount(&frontend)
        .await;

    let app = app_with_frontend(&frontend);
    let response = app
        .oneshot(get_with("/", Some("token=abc"), None))
        .await
        .unwrap();

    assert_eq!(body_text(response).await, "welcome");

    let received: Vec<MockRequest> = frontend.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_post_body_and_status_forwarded() {
    let frontend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/schedule/bookings"))
        .and(header_is("authorization", "Bearer W"))
        .and(body_string(r#"{"aircraft":"N172SP"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&frontend)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/schedule/bookings")
        .header(header::AUTHORIZATION, "Bearer W")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"aircraft":"N172SP"}"#))
        .unwrap();

    let app = app_with_frontend(&frontend);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_text(response).await, "created");
}

#[tokio::test]
async fn test_frontend_redirects_are_passed_through() {
    let frontend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/settings/profile"))
        .mount(&frontend)
        .await;

    let app = app_with_frontend(&frontend);
    let response = app
        .oneshot(get_with("/settings", Some("token=abc"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/settings/profile"
    );
}

#[tokio::test]
async fn test_unreachable_frontend_is_bad_gateway() {
    // Reserve a port, then free it so nothing is listening there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let mut config = test_config();
    config.upstream.url = Some(format!("http://127.0.0.1:{port}"));
    let response = test_app(config)
        .oneshot(get_with("/dashboard", Some("token=abc"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
