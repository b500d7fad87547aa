//! Typed client for the Redraft backend API.
//!
//! Unauthenticated endpoints (login, registration, password reset, the
//! public plan list) go straight through the HTTP client; everything else
//! is dispatched via the authenticated transport and gets the 401 →
//! refresh → retry handling for free.

mod paraphrase;
mod posts;
mod subscription;
mod users;

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use paraphrase::ReparaphraseRequest;

use crate::session::SessionStore;
use crate::transport::{AuthTransport, Navigator, Notifier};

/// A non-success backend response, carrying the `detail` message the
/// backend puts in error bodies.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: Option<String>,
}

impl ApiError {
    async fn from_response(response: Response) -> Self {
        let status = response.status();
        let detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("detail")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });
        Self {
            status,
            detail,
        }
    }

    /// Whether the backend rejected the call for subscription reasons
    /// (expired plan, daily limit).
    pub fn is_subscription_error(&self) -> bool {
        self.status == StatusCode::FORBIDDEN
            && self
                .detail
                .as_deref()
                .is_some_and(|detail| detail.contains("subscription"))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "HTTP {}: {detail}", self.status.as_u16()),
            None => write!(f, "HTTP {}", self.status.as_u16()),
        }
    }
}

impl std::error::Error for ApiError {}

/// Typed client over the backend endpoints the dashboard exercises.
pub struct ApiClient {
    http: reqwest::Client,
    transport: AuthTransport,
    store: Arc<dyn SessionStore>,
    base_url: String,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            transport: AuthTransport::new(&base_url, Arc::clone(&store), navigator, notifier),
            store,
            base_url,
        }
    }

    /// Overrides the login destination used on session expiry.
    pub fn with_login_path(mut self, path: &str) -> Self {
        self.transport = self.transport.with_login_path(path);
        self
    }

    /// Sets the location encoded as returnUrl on session expiry.
    pub fn with_return_path(mut self, path: &str) -> Self {
        self.transport = self.transport.with_return_path(path);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .transport
            .fetch_authenticated(crate::transport::ApiRequest::get(self.url(path)))
            .await?;
        read_json(response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        let response = self
            .transport
            .fetch_authenticated(crate::transport::ApiRequest::post(self.url(path), body))
            .await?;
        read_json(response).await
    }
}

/// Converts a non-2xx response into an [`ApiError`].
async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(ApiError::from_response(response).await.into())
}

/// Decodes a successful JSON response, converting non-2xx into [`ApiError`].
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .context("Failed to decode backend response")
}
