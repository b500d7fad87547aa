//! Paraphrasing endpoints.

use anyhow::Result;
use redraft_types::ParaphraseOutcome;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use super::ApiClient;
use crate::transport::ApiRequest;

/// Inputs for re-running paraphrasing over already edited content.
#[derive(Debug, Clone, Serialize)]
pub struct ReparaphraseRequest {
    pub content: String,
    /// Target length in words.
    pub word_length: u32,
    /// SEO keyword to keep in the rewrite.
    pub keyword: String,
    /// Original post URL.
    pub url: String,
    /// Original post title.
    pub title: String,
}

impl ApiClient {
    /// Paraphrases the post at `url`.
    ///
    /// A backend-side rejection (e.g. daily limit) arrives as an `error`
    /// field on the outcome rather than an HTTP error.
    pub async fn paraphrase(&self, title: &str, url: &str) -> Result<ParaphraseOutcome> {
        self.post_json("/api/paraphrase/", json!({ "title": title, "url": url }))
            .await
    }

    /// Re-runs paraphrasing over edited content with length and keyword
    /// hints.
    pub async fn reparaphrase(&self, request: &ReparaphraseRequest) -> Result<ParaphraseOutcome> {
        self.post_json("/api/reparaphrase/", serde_json::to_value(request)?)
            .await
    }

    /// Best-effort usage accounting after a publish or draft; failures are
    /// logged, never surfaced.
    pub async fn record_activity(&self, action_type: &str, details: &str, url: &str) {
        let request = ApiRequest::post(
            self.url("/api/record-activity/"),
            json!({ "action_type": action_type, "details": details, "url": url }),
        );
        match self.transport.fetch_authenticated(request).await {
            Ok(response) if !response.status().is_success() => {
                debug!(status = %response.status(), "activity recording rejected");
            }
            Ok(_) => {}
            Err(err) => debug!(error = %err, "activity recording failed"),
        }
    }
}
