//! Newtype IDs for type-safe entity references.
//!
//! Two flavours exist because the persisted records use both:
//! - `define_id!` wraps a sequential `i32` (user accounts are numbered)
//! - `define_key!` wraps an opaque string (catalog ids, `ord_...`, `msg_...`)

use chrono::{DateTime, Utc};

/// Macro to define a type-safe numeric ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
///
/// # Example
///
/// ```rust
/// # use atelier_core::define_id;
/// define_id!(AccountNumber);
/// define_id!(TicketNumber);
///
/// let account = AccountNumber::new(1);
/// let ticket = TicketNumber::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: AccountNumber = ticket;
/// # let _ = (account, ticket);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Macro to define a type-safe string key wrapper.
///
/// Creates a newtype wrapper around `String` with transparent serde,
/// `Display`, `AsRef<str>`, `From<&str>` and `From<String>`.
///
/// # Example
///
/// ```rust
/// # use atelier_core::define_key;
/// define_key!(SkuCode);
///
/// let sku = SkuCode::from("sneaker-01");
/// assert_eq!(sku.as_str(), "sneaker-01");
/// ```
#[macro_export]
macro_rules! define_key {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new key from any string.
            #[must_use]
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Returns the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the key and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }
    };
}

define_id!(UserId);

define_key!(ProductId);
define_key!(CategoryId);
define_key!(OrderId);
define_key!(MessageId);

/// Build a `<prefix>_<unix millis>` identifier.
///
/// Identifiers are human-inspectable and non-decreasing with the wall clock.
/// Two writers in the same millisecond receive the same value.
fn timestamped(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}_{}", now.timestamp_millis())
}

impl OrderId {
    /// Prefix of every generated order id.
    pub const PREFIX: &'static str = "ord";

    /// Generate an order id from the creation time.
    #[must_use]
    pub fn from_timestamp(now: DateTime<Utc>) -> Self {
        Self(timestamped(Self::PREFIX, now))
    }
}

impl MessageId {
    /// Prefix of every generated contact message id.
    pub const PREFIX: &'static str = "msg";

    /// Generate a contact message id from the creation time.
    #[must_use]
    pub fn from_timestamp(now: DateTime<Utc>) -> Self {
        Self(timestamped(Self::PREFIX, now))
    }
}

impl UserId {
    /// The id handed to the next registered account: one past the current count.
    #[must_use]
    pub fn next_after(existing: usize) -> Self {
        Self(i32::try_from(existing).map_or(i32::MAX, |n| n.saturating_add(1)))
    }
}
