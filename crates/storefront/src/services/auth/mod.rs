//! Authentication service.
//!
//! Password accounts with opaque bearer tokens. Passwords are stored as
//! Argon2id hashes. A token is 32 random bytes, base64url-encoded; each user
//! holds at most one, replaced at login and removed at logout. Tokens do not
//! expire.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};

use atelier_core::{Email, UserId};

use crate::db::users::{NewUser, UserRepository};
use crate::db::{DocumentStore, StoreError};
use crate::models::StoredUser;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Number of random bytes in a bearer token.
const TOKEN_BYTES: usize = 32;

/// Registration input.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'r> {
    pub name: &'r str,
    pub email: &'r str,
    pub password: &'r str,
}

/// Profile changes. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Authentication service.
///
/// Handles registration, login, logout, token lookup and profile changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            users: UserRepository::new(store),
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if name, email or password is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        registration: Registration<'_>,
        now: DateTime<Utc>,
    ) -> Result<StoredUser, AuthError> {
        let name = required("name", registration.name)?;
        required("email", registration.email)?;
        required("password", registration.password)?;

        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;
        let password_hash = hash_password(registration.password)?;

        self.users
            .create(NewUser {
                name,
                email: &email,
                password_hash: &password_hash,
                now,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Check credentials and issue a fresh token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or
    /// the password is wrong.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(StoredUser, SecretString), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let mut user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password)?;

        let token = issue_token();
        self.users
            .set_token(user.id, Some(token.expose_secret()))
            .await?;
        user.token = Some(token.expose_secret().to_owned());

        Ok((user, token))
    }

    /// Forget `token`. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store cannot be updated.
    pub async fn logout(&self, token: &SecretString) -> Result<(), AuthError> {
        self.users.clear_token(token.expose_secret()).await?;
        Ok(())
    }

    /// Resolve a bearer token to its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` if nobody holds `token`.
    pub async fn authenticate(&self, token: &SecretString) -> Result<StoredUser, AuthError> {
        self.users
            .get_by_token(token.expose_secret())
            .await?
            .ok_or(AuthError::Unauthenticated)
    }

    /// Apply `update` to user `id` and refresh its timestamp.
    ///
    /// The changes are applied to the stored record, not to the copy the
    /// caller authenticated with, so a logout or login racing this call keeps
    /// its effect on the token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` / `AuthError::WeakPassword` for
    /// invalid new values, `AuthError::UserAlreadyExists` if another
    /// account already uses the new email, and `AuthError::Unauthenticated`
    /// if the account no longer exists.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<StoredUser, AuthError> {
        let name = update
            .name
            .as_deref()
            .map(|name| required("name", name).map(str::to_owned))
            .transpose()?;
        let email = update.email.as_deref().map(Email::parse).transpose()?;
        let password = match &update.password {
            Some(password) => {
                validate_password(password.expose_secret())?;
                Some(hash_password(password.expose_secret())?)
            }
            None => None,
        };
        let ProfileUpdate { address, phone, .. } = update;

        self.users
            .update(id, move |user| {
                if let Some(name) = name {
                    user.name = name;
                }
                if let Some(email) = email {
                    user.email = email;
                }
                if let Some(password) = password {
                    user.password = password;
                }
                if address.is_some() {
                    user.address = address;
                }
                if phone.is_some() {
                    user.phone = phone;
                }
                user.timestamp = now;
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::UserAlreadyExists,
                StoreError::NotFound(_) => AuthError::Unauthenticated,
                other => AuthError::Repository(other),
            })
    }
}

/// Generate a new opaque bearer token.
#[must_use]
pub fn issue_token() -> SecretString {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    SecretString::from(URL_SAFE_NO_PAD.encode(bytes))
}

/// Trimmed value of a required field.
fn required<'v>(field: &'static str, value: &'v str) -> Result<&'v str, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(trimmed)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    const PASSWORD: &str = "correct horse";

    async fn registered(auth: &AuthService<'_>, email: &str) -> StoredUser {
        auth.register(
            Registration {
                name: "Ada",
                email,
                password: PASSWORD,
            },
            Utc::now(),
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password(PASSWORD).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(PASSWORD, &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn test_tokens_are_random_and_fixed_length() {
        let a = issue_token();
        let b = issue_token();
        assert_eq!(a.expose_secret().len(), 43);
        assert_ne!(a.expose_secret(), b.expose_secret());
        assert!(
            a.expose_secret()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        let user = registered(&auth, "ada@example.com").await;

        assert_ne!(user.password, PASSWORD);
        assert!(user.password.starts_with("$argon2id$"));
        assert!(user.token.is_none());
    }

    #[tokio::test]
    async fn test_register_validation() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        let attempt = |name: &'static str, email: &'static str, password: &'static str| {
            auth.register(
                Registration {
                    name,
                    email,
                    password,
                },
                Utc::now(),
            )
        };

        assert!(matches!(
            attempt("", "a@x.io", PASSWORD).await,
            Err(AuthError::MissingField("name"))
        ));
        assert!(matches!(
            attempt("Ada", "  ", PASSWORD).await,
            Err(AuthError::MissingField("email"))
        ));
        assert!(matches!(
            attempt("Ada", "a@x.io", "").await,
            Err(AuthError::MissingField("password"))
        ));
        assert!(matches!(
            attempt("Ada", "not-an-email", PASSWORD).await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            attempt("Ada", "a@x.io", "short").await,
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        registered(&auth, "ada@example.com").await;

        let again = auth
            .register(
                Registration {
                    name: "Imposter",
                    email: "ada@example.com",
                    password: PASSWORD,
                },
                Utc::now(),
            )
            .await;
        assert!(matches!(again, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_login_replaces_token_and_logout_clears_it() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        let user = registered(&auth, "ada@example.com").await;

        let (_, first) = auth.login("ada@example.com", PASSWORD).await.unwrap();
        let (logged_in, second) = auth.login("ada@example.com", PASSWORD).await.unwrap();
        assert_eq!(logged_in.id, user.id);

        assert!(matches!(
            auth.authenticate(&first).await,
            Err(AuthError::Unauthenticated)
        ));
        assert_eq!(auth.authenticate(&second).await.unwrap().id, user.id);

        auth.logout(&second).await.unwrap();
        assert!(auth.authenticate(&second).await.is_err());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        registered(&auth, "ada@example.com").await;

        for (email, password) in [
            ("ada@example.com", "wrong password"),
            ("nobody@example.com", PASSWORD),
            ("Ada@example.com", PASSWORD),
            ("garbage", PASSWORD),
        ] {
            assert!(
                matches!(
                    auth.login(email, password).await,
                    Err(AuthError::InvalidCredentials)
                ),
                "{email}"
            );
        }
    }

    #[tokio::test]
    async fn test_update_profile() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        let user = registered(&auth, "ada@example.com").await;
        registered(&auth, "taken@example.com").await;
        let before = user.timestamp;

        let taken = auth
            .update_profile(
                user.id,
                ProfileUpdate {
                    email: Some("taken@example.com".into()),
                    ..ProfileUpdate::default()
                },
                Utc::now(),
            )
            .await;
        assert!(matches!(taken, Err(AuthError::UserAlreadyExists)));

        let later = before + chrono::Duration::seconds(5);
        let updated = auth
            .update_profile(
                user.id,
                ProfileUpdate {
                    phone: Some("555-0100".into()),
                    password: Some(SecretString::from("another secret")),
                    ..ProfileUpdate::default()
                },
                later,
            )
            .await
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert_eq!(updated.timestamp, later);

        assert!(auth.login("ada@example.com", PASSWORD).await.is_err());
        assert!(auth.login("ada@example.com", "another secret").await.is_ok());
    }

    #[tokio::test]
    async fn test_profile_update_does_not_revive_logged_out_token() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        registered(&auth, "ada@example.com").await;
        let (_, token) = auth.login("ada@example.com", PASSWORD).await.unwrap();

        // The request authenticated before a concurrent logout landed
        let caller = auth.authenticate(&token).await.unwrap();
        auth.logout(&token).await.unwrap();

        let updated = auth
            .update_profile(
                caller.id,
                ProfileUpdate {
                    phone: Some("555-0100".into()),
                    ..ProfileUpdate::default()
                },
                Utc::now(),
            )
            .await
            .unwrap();

        assert!(updated.token.is_none());
        assert!(matches!(
            auth.authenticate(&token).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_profile_update_keeps_token_from_newer_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        registered(&auth, "ada@example.com").await;
        let (_, first) = auth.login("ada@example.com", PASSWORD).await.unwrap();
        let caller = auth.authenticate(&first).await.unwrap();
        let (_, second) = auth.login("ada@example.com", PASSWORD).await.unwrap();

        auth.update_profile(
            caller.id,
            ProfileUpdate {
                name: Some("Ada King".into()),
                ..ProfileUpdate::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();

        assert!(auth.authenticate(&first).await.is_err());
        assert_eq!(auth.authenticate(&second).await.unwrap().name, "Ada King");
    }
}
