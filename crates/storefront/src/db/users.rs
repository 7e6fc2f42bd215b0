//! User repository over the `users` collection.

use chrono::{DateTime, Utc};

use atelier_core::{Email, UserId};

use super::{DocumentStore, Records, StoreError, USERS, decode, decode_all};
use crate::models::StoredUser;

/// Fields of a new account, before it has an id.
#[derive(Debug)]
pub struct NewUser<'u> {
    pub name: &'u str,
    pub email: &'u Email,
    pub password_hash: &'u str,
    pub now: DateTime<Utc>,
}

/// Repository for user records.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Every stored user, in registration order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` if a record does not decode.
    pub async fn list(&self) -> Result<Vec<StoredUser>, StoreError> {
        decode_all(USERS, self.store.read_all(USERS).await?)
    }

    /// Get a user by exact (case-sensitive) email.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read or decoded.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<StoredUser>, StoreError> {
        Ok(self.list().await?.into_iter().find(|u| &u.email == email))
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read or decoded.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<StoredUser>, StoreError> {
        Ok(self.list().await?.into_iter().find(|u| u.id == id))
    }

    /// Get the user currently holding `token`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read or decoded.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<StoredUser>, StoreError> {
        if token.is_empty() {
            return Ok(None);
        }
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|u| u.token.as_deref() == Some(token)))
    }

    /// Create a user. The id is one past the current number of users.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email is already registered.
    /// Returns `StoreError` for storage failures.
    pub async fn create(&self, new: NewUser<'_>) -> Result<StoredUser, StoreError> {
        let mut created = None;

        self.store
            .modify(
                USERS,
                Box::new(|records: &mut Records| {
                    let existing: Vec<StoredUser> = decode_all(USERS, records.clone())?;
                    if existing.iter().any(|u| &u.email == new.email) {
                        return Err(StoreError::Conflict("email already exists".to_owned()));
                    }

                    let user = StoredUser {
                        id: UserId::next_after(existing.len()),
                        name: new.name.to_owned(),
                        email: new.email.clone(),
                        password: new.password_hash.to_owned(),
                        phone: None,
                        address: None,
                        token: None,
                        timestamp: new.now,
                    };
                    records.push(serde_json::to_value(&user)?);
                    created = Some(user);
                    Ok(())
                }),
            )
            .await?;

        created.ok_or_else(|| StoreError::NotFound("created user".to_owned()))
    }

    /// Apply `edit` to the current record of user `id` and write it back in
    /// one step. Returns the record as stored.
    ///
    /// `edit` always sees the freshly read record, so fields it does not touch
    /// (the token in particular) keep whatever value concurrent writers left.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no user has `id`.
    /// Returns `StoreError::Conflict` if the edit gives the user an email
    /// another account already has.
    pub async fn update<F>(&self, id: UserId, edit: F) -> Result<StoredUser, StoreError>
    where
        F: FnOnce(&mut StoredUser) + Send,
    {
        let mut updated = None;

        self.store
            .modify(
                USERS,
                Box::new(|records: &mut Records| {
                    let mut others: Vec<StoredUser> = decode_all(USERS, records.clone())?;
                    let index = others
                        .iter()
                        .position(|u| u.id == id)
                        .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;
                    let mut user = others.swap_remove(index);

                    edit(&mut user);
                    if others.iter().any(|u| u.email == user.email) {
                        return Err(StoreError::Conflict("email already in use".to_owned()));
                    }

                    if let Some(slot) = records.get_mut(index) {
                        *slot = serde_json::to_value(&user)?;
                    }
                    updated = Some(user);
                    Ok(())
                }),
            )
            .await?;

        updated.ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    /// Set or clear the bearer token of user `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no user has `id`.
    pub async fn set_token(&self, id: UserId, token: Option<&str>) -> Result<(), StoreError> {
        self.update(id, |user| user.token = token.map(str::to_owned))
            .await
            .map(|_| ())
    }

    /// Remove `token` from whichever user holds it. Returns whether one did.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` for storage failures.
    pub async fn clear_token(&self, token: &str) -> Result<bool, StoreError> {
        if token.is_empty() {
            return Ok(false);
        }
        let mut cleared = false;

        self.store
            .modify(
                USERS,
                Box::new(|records: &mut Records| {
                    for record in records.iter_mut() {
                        let mut user: StoredUser = decode(USERS, record.clone())?;
                        if user.token.as_deref() == Some(token) {
                            user.token = None;
                            *record = serde_json::to_value(&user)?;
                            cleared = true;
                        }
                    }
                    Ok(())
                }),
            )
            .await?;

        Ok(cleared)
    }
}
