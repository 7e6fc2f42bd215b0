//! Health checks, security headers, request IDs and fallbacks.

#![allow(clippy::unwrap_used)]

use atelier_integration_tests::{TestApp, test_config};
use atelier_storefront::StorefrontConfig;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let live = app.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, json!("ok"));

    let ready = app.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = TestApp::new();

    for uri in ["/api/products", "/api/products/nope", "/health"] {
        let response = app.get(uri).await;
        assert_eq!(response.header("x-frame-options"), Some("DENY"), "{uri}");
        assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
        assert_eq!(response.header("referrer-policy"), Some("no-referrer"));
        assert_eq!(response.header("cache-control"), Some("no-store, max-age=0"));
        assert!(response.header("content-security-policy").is_some());
    }
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "edge-1234")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.header("x-request-id"), Some("edge-1234"));
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = TestApp::new();

    let plain = app.get("/health").await;
    let generated = plain.header("x-request-id").unwrap();
    assert!(uuid_like(generated), "{generated}");

    let oversized = Request::builder()
        .uri("/health")
        .header("x-request-id", "x".repeat(200))
        .body(Body::empty())
        .unwrap();
    let response = app.send(oversized).await;
    assert!(uuid_like(response.header("x-request-id").unwrap()));
}

fn uuid_like(value: &str) -> bool {
    value.len() == 36 && value.chars().filter(|c| *c == '-').count() == 4
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new();

    let response = app.get("/api/does-not-exist").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), Some("Route not found"));
    assert_eq!(
        response.header("content-type"),
        Some("application/json")
    );
}

#[tokio::test]
async fn test_wrong_content_type_is_json_400() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();

    let response = app.send(request).await;
    assert!(response.status.is_client_error());
    assert!(response.error().is_some());
}

#[tokio::test]
async fn test_auth_rate_limit() {
    let app = TestApp::with_config(StorefrontConfig {
        rate_limit: true,
        ..test_config()
    });
    let body = json!({"email": "nobody@example.com", "password": "irrelevant"});

    let mut statuses = Vec::new();
    for _ in 0..8 {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-real-ip", "203.0.113.7")
            .body(Body::from(body.to_string()))
            .unwrap();
        statuses.push(app.send(request).await.status);
    }

    assert_eq!(statuses[0], StatusCode::UNAUTHORIZED);
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));

    // Catalog routes are not limited
    for _ in 0..10 {
        assert_eq!(app.get("/api/categories").await.status, StatusCode::OK);
    }
}
