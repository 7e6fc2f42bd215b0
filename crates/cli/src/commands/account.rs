//! Account commands. The token from `login` is kept in the state directory.

use secrecy::SecretString;

use super::{CommandResult, Context, print_json, print_lines};

/// `atelier register`
pub async fn register(ctx: &Context, name: &str, email: &str, password: SecretString) -> CommandResult {
    let user = ctx.api.register(name, email, &password).await?;
    print_lines([format!(
        "Registered {} <{}> as user {}; log in to continue",
        user.name, user.email, user.id
    )])
}

/// `atelier login`
pub async fn login(ctx: &mut Context, email: &str, password: SecretString) -> CommandResult {
    let response = ctx.api.login(email, &password).await?;
    ctx.storage
        .save_token(&SecretString::from(response.token))?;
    print_lines([format!("Logged in as {}", response.user.name)])
}

/// `atelier logout` - forgets the local token even if the server is unreachable.
pub async fn logout(ctx: &mut Context) -> CommandResult {
    let remote = ctx.api.logout().await;
    ctx.storage.clear_token()?;
    if let Err(e) = remote {
        tracing::warn!(error = %e, "Server logout failed; local token removed");
    }
    print_lines(["Logged out"])
}

/// `atelier me`
pub async fn me(ctx: &Context) -> CommandResult {
    print_json(&ctx.api.me().await?)
}
