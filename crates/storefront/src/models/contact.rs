//! Contact form record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::MessageId;

/// A contact form submission as stored in `contact-messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: MessageId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
