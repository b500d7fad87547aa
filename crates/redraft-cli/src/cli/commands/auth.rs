//! Account command handlers: login, logout, registration, password reset.

use anyhow::{Context, Result};
use redraft_core::SessionStore;

use super::required;
use crate::cli::AppContext;

pub async fn login(
    ctx: &AppContext,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = required(username, "Username")?;
    let password = required(password, "Password")?;

    let api = ctx.client("/auth/login");
    api.login(&username, &password).await?;

    // The profile cache lives next to the session and is cleared with it.
    let profile = api.profile().await?;
    ctx.store
        .cache_profile(&serde_json::to_string(&profile).context("serialize profile")?)?;

    println!("Logged in as {}", profile.username);
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    let had_session = ctx.store.get().is_some();

    let api = ctx.client("/");
    api.logout().await?;

    if had_session {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub async fn register(
    ctx: &AppContext,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = required(username, "Username")?;
    let email = required(email, "Email")?;
    let password = required(password, "Password")?;

    let api = ctx.client("/auth/register");
    api.register(&username, &email, &password).await?;

    println!("Registered {username}. Log in with `redraft login`.");
    Ok(())
}

pub async fn request_password_reset(ctx: &AppContext, email: &str) -> Result<()> {
    let api = ctx.client("/auth/forgot-password");
    api.request_password_reset(email).await?;

    println!("If an account exists for {email}, a reset email is on its way.");
    Ok(())
}

pub async fn confirm_password_reset(
    ctx: &AppContext,
    uid: &str,
    token: &str,
    new_password: Option<String>,
) -> Result<()> {
    let new_password = required(new_password, "New password")?;

    let api = ctx.client("/reset-password");
    api.confirm_password_reset(uid, token, &new_password).await?;

    println!("Password updated. Log in with `redraft login`.");
    Ok(())
}
