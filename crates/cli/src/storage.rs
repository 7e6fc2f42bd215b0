//! File-backed client state.
//!
//! Every key is one file, `<state_dir>/<key>.json`, replaced atomically by
//! writing a temporary sibling and renaming it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};

use atelier_core::shopping::{StateError, StateStorage};

/// Key under which the bearer token is kept.
pub const TOKEN_KEY: &str = "token";

/// [`StateStorage`] writing one file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StateError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StateError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid state key: {key:?}"),
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Delete the value under `key`. Missing values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the file exists but cannot be removed.
    pub fn remove(&mut self, key: &str) -> Result<(), StateError> {
        match std::fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// The saved bearer token, if logged in.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the token file cannot be read or decoded.
    pub fn token(&self) -> Result<Option<SecretString>, StateError> {
        self.load(TOKEN_KEY)?
            .map(|raw| serde_json::from_str::<String>(&raw).map(SecretString::from))
            .transpose()
            .map_err(StateError::from)
    }

    /// Persist the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the token file cannot be written.
    pub fn save_token(&mut self, token: &SecretString) -> Result<(), StateError> {
        let encoded = serde_json::to_string(token.expose_secret())?;
        self.save(TOKEN_KEY, &encoded)
    }

    /// Forget the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the token file cannot be removed.
    pub fn clear_token(&mut self) -> Result<(), StateError> {
        self.remove(TOKEN_KEY)
    }
}

impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StateError> {
        match std::fs::read_to_string(self.path_for(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StateError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_core::catalog::Product;
    use atelier_core::shopping::{CART_KEY, ShoppingStore, WISHLIST_KEY};
    use atelier_core::{Price, Size};

    use super::*;

    fn product(id: &str, price: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "slug": format!("product-{id}"),
            "name": format!("Product {id}"),
            "basePrice": price,
            "size": [8, 9, 10],
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_key_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("state"));
        assert!(storage.load(CART_KEY).unwrap().is_none());
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("state");

        let mut store = ShoppingStore::open(FileStorage::new(&state_dir));
        store.add_to_cart(&product("p1", 20), Size::from(9)).unwrap();
        store.add_to_cart(&product("p1", 20), Size::from(9)).unwrap();
        store.add_to_wishlist(&product("p2", 15)).unwrap();

        let reopened = ShoppingStore::open(FileStorage::new(&state_dir));
        assert_eq!(reopened.cart_items_count(), 2);
        assert_eq!(reopened.cart_total(), Price::from_units(40));
        assert_eq!(reopened.wishlist_items_count(), 1);
        assert!(state_dir.join("cart.json").exists());
        assert!(state_dir.join("wishlist.json").exists());
        assert!(!state_dir.join("cart.json.tmp").exists());
    }

    #[test]
    fn test_malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wishlist.json"), "not json").unwrap();

        let store = ShoppingStore::open(FileStorage::new(dir.path()));
        assert_eq!(store.wishlist_items_count(), 0);
        assert!(
            FileStorage::new(dir.path())
                .load(WISHLIST_KEY)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_token_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        assert!(storage.token().unwrap().is_none());

        storage.save_token(&SecretString::from("abc")).unwrap();
        assert_eq!(storage.token().unwrap().unwrap().expose_secret(), "abc");

        storage.clear_token().unwrap();
        storage.clear_token().unwrap();
        assert!(storage.token().unwrap().is_none());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let storage = FileStorage::new("state");
        assert!(storage.load("../cart").is_err());
        assert!(storage.load("").is_err());
    }
}
