//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Password accounts and bearer tokens

pub mod auth;
