//! Contact message repository over the `contact-messages` collection.

use super::{CONTACT_MESSAGES, DocumentStore, StoreError, decode_all};
use crate::models::ContactMessage;

/// Repository for contact form submissions.
pub struct MessageRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Append a submission.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the message cannot be encoded or written.
    pub async fn append(&self, message: &ContactMessage) -> Result<(), StoreError> {
        self.store
            .append(CONTACT_MESSAGES, serde_json::to_value(message)?)
            .await
    }

    /// Every stored submission, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read or decoded.
    pub async fn list(&self) -> Result<Vec<ContactMessage>, StoreError> {
        decode_all(
            CONTACT_MESSAGES,
            self.store.read_all(CONTACT_MESSAGES).await?,
        )
    }
}
