//! Stored record types for the storefront.
//!
//! These are the shapes persisted in the document store. API responses use
//! the public views from `atelier_core` instead (e.g.
//! [`atelier_core::account::UserProfile`]), so credentials never leave this crate.

pub mod contact;
pub mod user;

pub use contact::ContactMessage;
pub use user::StoredUser;
