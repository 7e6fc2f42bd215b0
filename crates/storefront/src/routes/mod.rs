//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (catalog loads)
//!
//! # Catalog
//! GET  /api/products           - Filter, sort and paginate products
//! GET  /api/products/{slug}    - Product detail with related products
//! GET  /api/categories         - Categories with product counts
//! GET  /api/categories/{slug}  - One category
//!
//! # Auth
//! POST /api/auth/register      - Create an account
//! POST /api/auth/login         - Issue a token (rate limited)
//! POST /api/auth/logout        - Forget the caller's token
//! GET  /api/auth/me            - Caller's profile
//! PUT  /api/users/update       - Change the caller's profile
//!
//! # Orders (requires auth)
//! POST /api/orders             - Place an order
//! GET  /api/orders             - Caller's orders
//!
//! # Contact
//! POST /api/contact            - Submit the contact form
//! ```

pub mod auth;
pub mod categories;
pub mod contact;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts, Request},
    middleware::from_fn,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// JSON body extractor whose rejections are JSON `AppError`s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections are JSON `AppError`s.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Create the health check router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{slug}", get(categories::show))
}

/// Create the auth routes router.
///
/// Registration and login are rate limited per client IP when enabled.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let credentials = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register));

    let credentials = match rate_limit.then(auth_rate_limiter).flatten() {
        Some(limiter) => credentials.layer(limiter),
        None => credentials,
    };

    Router::new()
        .merge(credentials)
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", post(orders::create).get(orders::index))
}

/// Create all API routes for the storefront.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/auth", auth_routes(rate_limit))
        .route("/users/update", put(users::update))
        .nest("/orders", order_routes())
        .route("/contact", post(contact::submit))
}

/// Build the complete application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let rate_limit = state.config().rate_limit;

    Router::new()
        .nest("/health", health_routes())
        .nest("/api", routes(rate_limit))
        .fallback(fallback)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                    )
                }))
                .layer(from_fn(request_id_middleware))
                .layer(from_fn(security_headers_middleware)),
        )
        .with_state(state)
}

/// JSON 404 for unknown paths.
async fn fallback() -> AppError {
    AppError::NotFound("Route".to_owned())
}
