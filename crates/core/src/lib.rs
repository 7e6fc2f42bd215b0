//! Atelier Core - Shared types and shopping logic.
//!
//! This crate is used by every Atelier component:
//! - `storefront` - JSON API serving the catalog, accounts and orders
//! - `cli` - Client shell that owns the cart and wishlist and performs checkout
//!
//! # Architecture
//!
//! The core crate contains types, traits and pure transformations only - no
//! network access and no file I/O. Persistence is expressed through traits
//! (see [`shopping::StateStorage`]) that the binaries implement.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, sizes, emails and statuses
//! - [`catalog`] - The versioned product catalog schema
//! - [`query`] - Product filter / sort / paginate pipeline
//! - [`shopping`] - Cart and wishlist state with derived totals
//! - [`order`] - Order assembly from a cart snapshot
//! - [`account`] - Public user profile shared by API and client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod catalog;
pub mod order;
pub mod query;
pub mod shopping;
pub mod types;

pub use types::*;
