//! Contact form route handler.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use atelier_core::MessageId;

use super::ApiJson;
use super::auth::Success;
use crate::db::messages::MessageRepository;
use crate::error::{AppError, Result};
use crate::models::ContactMessage;
use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// Submit the contact form.
///
/// POST /api/contact
#[instrument(skip_all, fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<ContactForm>,
) -> Result<Json<Success>> {
    let fields = [&form.name, &form.email, &form.subject, &form.message];
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::BadRequest("All fields are required".to_owned()));
    }

    let now = Utc::now();
    let message = ContactMessage {
        id: MessageId::from_timestamp(now),
        name: form.name.trim().to_owned(),
        email: form.email.trim().to_owned(),
        subject: form.subject.trim().to_owned(),
        message: form.message,
        created_at: now,
    };
    MessageRepository::new(state.store()).append(&message).await?;

    tracing::info!(message_id = %message.id, "Contact message received");
    Ok(Json(Success { success: true }))
}
