//! User account record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::account::{RegisteredUser, UserProfile};
use atelier_core::{Email, UserId};

/// A user account as stored in the `users` collection.
///
/// `password` holds an Argon2id PHC string, never the plaintext. `token` is
/// the single live bearer token, replaced at each login and removed at logout.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// When the record was created or last modified.
    pub timestamp: DateTime<Utc>,
}

impl std::fmt::Debug for StoredUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredUser")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("phone", &self.phone)
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl StoredUser {
    /// The credential-free view returned by the API.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            timestamp: self.timestamp,
        }
    }

    /// The body returned after registration.
    #[must_use]
    pub fn registered(&self) -> RegisteredUser {
        RegisteredUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> StoredUser {
        StoredUser {
            id: UserId::new(1),
            name: "Ada".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            phone: None,
            address: None,
            token: Some("live-token".to_string()),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let debug = format!("{:?}", user());
        assert!(!debug.contains("argon2id"));
        assert!(!debug.contains("live-token"));
        assert!(debug.contains("ada@example.com"));
    }

    #[test]
    fn test_profile_has_no_credentials() {
        let json = serde_json::to_value(user().profile()).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("token").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let json = serde_json::to_value(user()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["token"], "live-token");
        let back: StoredUser = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, UserId::new(1));
    }
}
