//! JSON-file document store.
//!
//! Each collection lives in `<data_dir>/<collection>.json` as a pretty-printed
//! array. Writes go to a sibling temporary file that is then renamed over the
//! original, so readers never observe a half-written file. Writers inside one
//! process are serialized per collection; separate processes writing the same
//! directory are not coordinated.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{DocumentStore, Mutation, Records, StoreError};

/// Document store backed by one JSON file per collection.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Directory holding the collection files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `collection`.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` I/O error for names that are not plain
    /// lowercase identifiers, so a collection can never escape the directory.
    pub fn collection_path(&self, collection: &str) -> Result<PathBuf, StoreError> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid collection name: {collection:?}"),
            )));
        }
        Ok(self.dir.join(format!("{collection}.json")))
    }

    fn lock_for(&self, collection: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(collection.to_owned()).or_default())
    }

    async fn load(&self, collection: &str) -> Result<Records, StoreError> {
        let path = self.collection_path(collection)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Records>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(
                    collection,
                    path = %path.display(),
                    error = %e,
                    "Collection file is not a JSON array, treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn store(&self, collection: &str, records: &Records) -> Result<(), StoreError> {
        let path = self.collection_path(collection)?;
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(records)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(collection, records = records.len(), "Collection written");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn read_all(&self, collection: &str) -> Result<Records, StoreError> {
        self.load(collection).await
    }

    async fn write_all(&self, collection: &str, records: Records) -> Result<(), StoreError> {
        let lock = self.lock_for(collection);
        let _guard = lock.lock().await;
        self.store(collection, &records).await
    }

    async fn modify<'a>(&self, collection: &str, mutation: Mutation<'a>) -> Result<(), StoreError> {
        let lock = self.lock_for(collection);
        let _guard = lock.lock().await;

        let mut records = self.load(collection).await?;
        mutation(&mut records)?;
        self.store(collection, &records).await
    }
}
