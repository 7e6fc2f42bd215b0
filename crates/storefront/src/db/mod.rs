//! Record storage for the storefront.
//!
//! # Collections
//!
//! Every collection is an ordered list of JSON documents:
//!
//! - `users` - Accounts with password hash and current bearer token
//! - `orders` - Placed orders, append-only
//! - `contact-messages` - Contact form submissions, append-only
//!
//! The [`DocumentStore`] trait hides the storage engine. Two backends exist:
//! [`JsonFileStore`] (one pretty-printed `<collection>.json` file per
//! collection) and [`MemoryStore`] (tests, throwaway instances). Typed
//! repositories in the submodules decode records at this boundary.

pub mod json_file;
pub mod memory;
pub mod messages;
pub mod orders;
pub mod users;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Collection holding user accounts.
pub const USERS: &str = "users";
/// Collection holding placed orders.
pub const ORDERS: &str = "orders";
/// Collection holding contact form submissions.
pub const CONTACT_MESSAGES: &str = "contact-messages";

/// The records of one collection, in insertion order.
pub type Records = Vec<Value>;

/// An in-place edit of a whole collection, applied atomically by
/// [`DocumentStore::modify`]. Returning an error leaves the collection as it was.
pub type Mutation<'a> = Box<dyn FnOnce(&mut Records) -> Result<(), StoreError> + Send + 'a>;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium could not be read or written.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record does not match its schema.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Record not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint would be violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Storage engine for record collections.
///
/// Implementations must make [`modify`](DocumentStore::modify) atomic with
/// respect to other calls on the same collection through the same store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All records of `collection`. A collection that was never written is empty.
    async fn read_all(&self, collection: &str) -> Result<Records, StoreError>;

    /// Replace the whole collection.
    async fn write_all(&self, collection: &str, records: Records) -> Result<(), StoreError>;

    /// Read, edit and write back `collection` as one step.
    async fn modify<'a>(&self, collection: &str, mutation: Mutation<'a>) -> Result<(), StoreError>;

    /// Replace the record whose `id` equals `record["id"]`, or append it.
    async fn upsert(&self, collection: &str, record: Value) -> Result<(), StoreError> {
        let id = record
            .get("id")
            .cloned()
            .ok_or_else(|| StoreError::DataCorruption("record has no id".to_owned()))?;

        self.modify(
            collection,
            Box::new(move |records: &mut Records| {
                match records.iter_mut().find(|r| r.get("id") == Some(&id)) {
                    Some(existing) => *existing = record,
                    None => records.push(record),
                }
                Ok(())
            }),
        )
        .await
    }

    /// Append `record` at the end of the collection.
    async fn append(&self, collection: &str, record: Value) -> Result<(), StoreError> {
        self.modify(
            collection,
            Box::new(move |records: &mut Records| {
                records.push(record);
                Ok(())
            }),
        )
        .await
    }
}

/// Decode every record of a collection into `T`.
pub(crate) fn decode_all<T: serde::de::DeserializeOwned>(
    collection: &str,
    records: Records,
) -> Result<Vec<T>, StoreError> {
    records
        .into_iter()
        .map(|record| decode(collection, record))
        .collect()
}

/// Decode one record into `T`.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    collection: &str,
    record: Value,
) -> Result<T, StoreError> {
    serde_json::from_value(record)
        .map_err(|e| StoreError::DataCorruption(format!("invalid record in {collection}: {e}")))
}
