//! Account management handlers.

use axum::{Json, extract::State};
use chrono::Utc;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use atelier_core::account::UserProfile;

use super::ApiJson;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::auth::{AuthService, ProfileUpdate};
use crate::state::AppState;

/// Profile update body. Absent fields are left unchanged.
#[derive(Deserialize)]
pub struct UpdateProfileForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl From<UpdateProfileForm> for ProfileUpdate {
    fn from(form: UpdateProfileForm) -> Self {
        Self {
            name: form.name,
            email: form.email,
            password: form.password.map(SecretString::from),
            address: form.address,
            phone: form.phone,
        }
    }
}

/// Update the caller's profile.
///
/// PUT /api/users/update
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(form): ApiJson<UpdateProfileForm>,
) -> Result<Json<UserProfile>> {
    let updated = AuthService::new(state.store())
        .update_profile(user.id, form.into(), Utc::now())
        .await?;

    tracing::info!("Profile updated");
    Ok(Json(updated.profile()))
}
