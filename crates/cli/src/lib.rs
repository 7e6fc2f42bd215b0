//! Atelier CLI library.
//!
//! The client side of the storefront: it owns the cart and the wishlist,
//! persists them in a state directory, and talks to the JSON API for the
//! catalog, the account and checkout.
//!
//! # Modules
//!
//! - [`storage`] - File-backed [`StateStorage`](atelier_core::shopping::StateStorage)
//! - [`api`] - HTTP client for the storefront API
//! - [`orders`] - Checkout and the local order list

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod orders;
pub mod storage;
