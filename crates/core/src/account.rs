//! Public account views shared by the API and its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId};

/// A user's profile without credentials.
///
/// This is what `GET /api/auth/me` and `PUT /api/users/update` return. The
/// stored record additionally carries the password hash and the bearer token,
/// neither of which ever leaves the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Last time the account was created or modified.
    pub timestamp: DateTime<Utc>,
}

/// The short identity returned alongside a fresh token at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
}

impl From<&UserProfile> for SessionUser {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            name: profile.name.clone(),
        }
    }
}

/// Response body of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: SessionUser,
    pub token: String,
}

/// Response body of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_omits_missing_optionals() {
        let profile = UserProfile {
            id: UserId::new(3),
            name: "Ada".into(),
            email: Email::parse("ada@example.com").unwrap(),
            phone: None,
            address: Some("1 Loom St".into()),
            timestamp: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["address"], "1 Loom St");
        assert!(json.get("phone").is_none());
        assert!(json.get("password").is_none());

        let session = SessionUser::from(&profile);
        assert_eq!(session.email.as_str(), "ada@example.com");
    }
}
