//! Login and logout command implementation

use super::Context;
use anyhow::{Context as _, Result};
use lectern_core::session::{AuthToken, Credentials, Role, SignIn};

/// Store credentials issued by the sign-in service
pub fn login(
    ctx: &Context,
    token: String,
    user_id: Option<i64>,
    name: Option<String>,
    role: Option<Role>,
) -> Result<()> {
    if token.trim().is_empty() {
        anyhow::bail!("Token must not be empty");
    }

    let credentials = Credentials {
        token: AuthToken::new(token.trim()),
        user_id,
        name,
        role,
    };
    SignIn::new(ctx.store.clone())
        .store_credentials(&credentials)
        .context("Failed to save credentials")?;

    let session = ctx.session();
    match session.display_name() {
        Some(name) => println!("Signed in as {}", name),
        None => println!("Signed in"),
    }
    if let Some(role) = session.role() {
        tracing::debug!("Role {} (uploads allowed: {})", role.as_str(), role.can_upload());
    }

    Ok(())
}

/// Forget stored credentials
pub fn logout(ctx: &Context) -> Result<()> {
    SignIn::new(ctx.store.clone())
        .sign_out()
        .context("Failed to clear credentials")?;
    println!("Signed out");
    Ok(())
}
