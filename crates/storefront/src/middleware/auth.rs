//! Authentication extractors and token cookie helpers.
//!
//! A request authenticates with `Authorization: Bearer <token>` or, failing
//! that, with the `token` cookie set at login.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{AppError, set_sentry_user};
use crate::models::StoredUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Name of the cookie carrying the bearer token.
pub const TOKEN_COOKIE: &str = "token";

/// The bearer token presented with the request, if any.
pub struct SessionToken(pub Option<SecretString>);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(token_from_headers(&parts.headers)))
    }
}

/// Extractor that requires an authenticated user.
///
/// Rejects with 401 when no token is presented or nobody holds it.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub StoredUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(AuthError::Unauthenticated)?;
        let user = AuthService::new(state.store()).authenticate(&token).await?;

        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(user))
    }
}

/// Token from the `Authorization` header, or else from the token cookie.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<SecretString> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer
        .or_else(|| {
            headers
                .get_all(COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .find_map(|v| cookie_value(v, TOKEN_COOKIE))
        })
        .map(|t| SecretString::from(t.to_owned()))
}

/// Value of cookie `name` in a `Cookie` header.
fn cookie_value<'h>(header: &'h str, name: &str) -> Option<&'h str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then_some(value)
    })
}

/// `Set-Cookie` value storing `token`.
///
/// # Errors
///
/// Returns `AppError::Internal` if the token contains bytes not allowed in a header.
pub fn token_cookie(token: &SecretString, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "{TOKEN_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/",
        token.expose_secret()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.to_string()))
}

/// `Set-Cookie` value that expires the token cookie.
#[must_use]
pub fn expired_token_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("token=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Secure")
    } else {
        HeaderValue::from_static("token=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
    }
}
