//! Integration tests for Atelier.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atelier-integration-tests
//! ```
//!
//! Everything runs in-process: the storefront router is driven with
//! `tower::ServiceExt::oneshot` over an in-memory record store and the sample
//! catalog in `data/products.json`. Tests that need real HTTP (the CLI client)
//! bind the router to an ephemeral local port with [`spawn_server`].
//!
//! # Test Categories
//!
//! - `catalog_api` - Product listing, detail and categories
//! - `auth_api` - Registration, login, tokens and profile updates
//! - `orders_api` - Checkout, order history and contact messages
//! - `middleware` - Health, security headers, request IDs, fallbacks
//! - `json_store` - The storefront over the JSON-file backend
//! - `cli_checkout` - The CLI client and order book against a live server

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::Arc;

use atelier_core::catalog::Catalog;
use atelier_storefront::catalog::StaticCatalog;
use atelier_storefront::db::{DocumentStore, MemoryStore};
use atelier_storefront::{AppState, StorefrontConfig, app};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

/// The sample catalog shipped in `data/products.json`.
pub const CATALOG_JSON: &str = include_str!("../../../data/products.json");

/// Password used by every test account.
pub const PASSWORD: &str = "correct horse battery";

/// Parsed sample catalog.
#[must_use]
pub fn catalog() -> Catalog {
    Catalog::from_json(CATALOG_JSON).expect("sample catalog is valid")
}

/// Default configuration with rate limiting off.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        rate_limit: false,
        ..StorefrontConfig::default()
    }
}

/// State over `store` and the sample catalog.
#[must_use]
pub fn test_state(config: StorefrontConfig, store: Arc<dyn DocumentStore>) -> AppState {
    AppState::new(config, store, Arc::new(StaticCatalog::new(catalog())))
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body, or the raw text as a JSON string for non-JSON bodies.
    pub body: Value,
}

impl TestResponse {
    /// The `error` message of a JSON error body.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    /// Value of response header `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Send `request` through `router` and decode the response.
pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body can be read");
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    TestResponse {
        status,
        headers,
        body,
    }
}

/// The storefront router over an in-memory store.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = app(test_state(config, Arc::clone(&store) as Arc<dyn DocumentStore>));
        Self { router, store }
    }

    /// The backing record store.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        send(&self.router, request).await
    }

    /// Build and send a request with an optional JSON body and bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("request is valid")).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn get_with_token(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, None, Some(token)).await
    }

    pub async fn post(&self, uri: &str, body: &Value, token: Option<&str>) -> TestResponse {
        self.request(Method::POST, uri, Some(body), token).await
    }

    pub async fn put(&self, uri: &str, body: &Value, token: Option<&str>) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), token).await
    }

    /// Register an account with [`PASSWORD`].
    pub async fn register(&self, name: &str, email: &str) -> TestResponse {
        let body = serde_json::json!({ "name": name, "email": email, "password": PASSWORD });
        self.post("/api/auth/register", &body, None).await
    }

    /// Log in with [`PASSWORD`] and return the token.
    pub async fn login(&self, email: &str) -> String {
        let body = serde_json::json!({ "email": email, "password": PASSWORD });
        let response = self.post("/api/auth/login", &body, None).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["token"]
            .as_str()
            .expect("login returns a token")
            .to_owned()
    }

    /// Register and log in, returning the token.
    pub async fn signed_in(&self, name: &str, email: &str) -> String {
        let registered = self.register(name, email).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);
        self.login(email).await
    }
}

/// Serve `state` on an ephemeral local port. Returns the base URL.
pub async fn spawn_server(state: AppState) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener has an address");

    tokio::spawn(async move {
        axum::serve(
            listener,
            app(state).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    });

    Url::parse(&format!("http://{addr}")).expect("valid base URL")
}

/// A shipping address with every field filled in.
#[must_use]
pub fn shipping_address() -> Value {
    serde_json::json!({
        "fullName": "Ada Lovelace",
        "streetAddress": "12 Marylebone Road",
        "city": "London",
        "state": "Greater London",
        "postalCode": "NW1 5LR",
        "country": "GB",
        "phone": "+44 20 7946 0000"
    })
}
