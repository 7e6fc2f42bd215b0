//! Atelier Storefront library.
//!
//! The JSON API as a library so the binary, the integration tests and other
//! shells can build the same router over any [`db::DocumentStore`] and
//! [`catalog::CatalogSource`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::StorefrontConfig;
pub use routes::app;
pub use state::AppState;
