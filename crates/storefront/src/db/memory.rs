//! In-memory document store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{DocumentStore, Mutation, Records, StoreError};

/// Document store holding every collection in process memory.
///
/// Contents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Records>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read_all(&self, collection: &str) -> Result<Records, StoreError> {
        let collections = self.collections.lock().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn write_all(&self, collection: &str, records: Records) -> Result<(), StoreError> {
        self.collections
            .lock()
            .await
            .insert(collection.to_owned(), records);
        Ok(())
    }

    async fn modify<'a>(&self, collection: &str, mutation: Mutation<'a>) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().await;
        let mut records = collections.get(collection).cloned().unwrap_or_default();
        mutation(&mut records)?;
        collections.insert(collection.to_owned(), records);
        Ok(())
    }
}
