//! Authentication route handlers.
//!
//! Password login issuing opaque bearer tokens. The token is returned in the
//! body for API clients and set as an HttpOnly cookie for browsers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use atelier_core::account::{LoginResponse, RegisteredUser, SessionUser, UserProfile};

use super::ApiJson;
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{expired_token_cookie, token_cookie};
use crate::middleware::{RequireAuth, SessionToken};
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Generic success body.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

/// Create an account.
///
/// POST /api/auth/register
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<RegisterForm>,
) -> Result<(StatusCode, Json<RegisteredUser>)> {
    let user = AuthService::new(state.store())
        .register(
            Registration {
                name: &form.name,
                email: &form.email,
                password: &form.password,
            },
            Utc::now(),
        )
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.registered())))
}

/// Log in and issue a token.
///
/// POST /api/auth/login
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginForm>,
) -> Result<impl IntoResponse> {
    let (user, token) = AuthService::new(state.store())
        .login(&form.email, &form.password)
        .await?;

    let cookie = token_cookie(&token, state.config().secure_cookies)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("auth", "User logged in", None);
    tracing::info!(user_id = %user.id, "User logged in");

    let body = LoginResponse {
        user: SessionUser::from(&user.profile()),
        token: token.expose_secret().to_owned(),
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)))
}

/// Log out. Succeeds whether or not a token was presented.
///
/// POST /api/auth/logout
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<impl IntoResponse> {
    if let Some(token) = token {
        AuthService::new(state.store()).logout(&token).await?;
    }
    clear_sentry_user();

    Ok((
        [(SET_COOKIE, expired_token_cookie(state.config().secure_cookies))],
        Json(Success { success: true }),
    ))
}

/// The caller's profile.
///
/// GET /api/auth/me
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn me(RequireAuth(user): RequireAuth) -> Json<UserProfile> {
    Json(user.profile())
}
