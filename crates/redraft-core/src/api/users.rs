//! Account endpoints: login, registration, password reset, profile.

use anyhow::{Context, Result};
use redraft_types::UserProfile;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{ApiClient, check_status, read_json};
use crate::session::Session;

#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

impl ApiClient {
    /// Logs in and persists the returned token pair in the session store.
    ///
    /// # Errors
    /// Returns an error when the credentials are rejected or the session
    /// cannot be stored.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/users/login/"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .context("Failed to send login request")?;

        let tokens: TokenPair = read_json(response).await?;
        self.store.set(Session {
            access: tokens.access,
            refresh: tokens.refresh,
        })?;

        Ok(())
    }

    /// Registers a new account. Does not log in.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/users/register/"))
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await
            .context("Failed to send registration request")?;

        check_status(response).await?;
        Ok(())
    }

    /// Best-effort server-side logout, then local session teardown.
    ///
    /// The store is cleared even when the server call fails, matching the
    /// "always drop local state" logout contract.
    pub async fn logout(&self) -> Result<()> {
        if let Some(session) = self.store.get() {
            let result = self
                .http
                .post(self.url("/api/users/logout/"))
                .header("Authorization", format!("Bearer {}", session.access))
                .json(&json!({ "refresh": session.refresh }))
                .send()
                .await;
            match result {
                Ok(response) if !response.status().is_success() => {
                    debug!(status = %response.status(), "server-side logout rejected");
                }
                Ok(_) => {}
                Err(err) => debug!(error = %err, "server-side logout failed"),
            }
        }

        self.store.clear()
    }

    /// Fetches the logged-in user's profile.
    pub async fn profile(&self) -> Result<UserProfile> {
        self.get_json("/api/users/user/").await
    }

    /// Sends a password-reset email.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/password-reset/"))
            .json(&json!({ "email": email }))
            .send()
            .await
            .context("Failed to send password-reset request")?;

        check_status(response).await?;
        Ok(())
    }

    /// Completes a password reset with the uid and token from the email.
    pub async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        new_password: &str,
    ) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/password-reset/confirm/"))
            .json(&json!({ "uid": uid, "token": token, "new_password": new_password }))
            .send()
            .await
            .context("Failed to send password-reset confirmation")?;

        check_status(response).await?;
        Ok(())
    }
}
