//! Shared wire types for the Redraft backend API.
//!
//! Field names and shapes mirror what the backend actually sends; anything
//! the backend is allowed to omit is an `Option` with a serde default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post pulled from the user's blog, ready to paraphrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub url: String,
}

/// A previously pulled post as the backend stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPost {
    pub id: i64,
    pub title: String,
    /// Origin URL the post was pulled from.
    pub source: String,
    pub created_at: DateTime<Utc>,
    /// Owning user id.
    pub user: i64,
}

/// A published post summary (recent posts, posted history).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentPost {
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl RecentPost {
    /// Best available timestamp: creation time, falling back to publish time.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.published_at)
    }
}

/// Outcome of a paraphrase request.
///
/// The backend capitalizes the content fields; `error` is set instead of
/// them when paraphrasing was rejected (e.g. over the daily limit).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParaphraseOutcome {
    /// Original post content.
    #[serde(rename = "Post", default, skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
    /// Paraphrased content.
    #[serde(
        rename = "Paraphrased",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub paraphrased: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParaphraseOutcome {
    /// Returns the backend-reported error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

/// A subscription plan offered by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    /// Price as the backend renders it (decimal string).
    pub price: String,
    /// Paraphrase requests allowed per day.
    pub daily_limit: u32,
    /// Plan duration in days.
    pub duration: u32,
}

/// The logged-in user's subscription state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionDetails {
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub daily_limit: Option<u32>,
    #[serde(default)]
    pub requests_today: Option<u32>,
}

impl SubscriptionDetails {
    /// Whether the subscription currently allows paraphrasing.
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_deref(), Some("active"))
    }
}

/// Receipt from the subscribe endpoint.
///
/// A `payment_url` means the user must complete checkout externally; its
/// absence means the subscription was activated directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscribeReceipt {
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Profile of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// One row of the user's daily usage record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActivity {
    pub id: i64,
    pub user: i64,
    #[serde(default)]
    pub daily_api_requests: u32,
    #[serde(default)]
    pub posts_published: u32,
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: paraphrase outcome deserializes the capitalized wire fields.
    #[test]
    fn test_paraphrase_outcome_wire_fields() {
        let outcome: ParaphraseOutcome = serde_json::from_str(
            r#"{"Post": "original text", "Paraphrased": "rewritten text"}"#,
        )
        .unwrap();

        assert_eq!(outcome.post.as_deref(), Some("original text"));
        assert_eq!(outcome.paraphrased.as_deref(), Some("rewritten text"));
        assert!(outcome.error().is_none());
    }

    /// Test: paraphrase outcome surfaces backend errors.
    #[test]
    fn test_paraphrase_outcome_error() {
        let outcome: ParaphraseOutcome =
            serde_json::from_str(r#"{"error": "Daily limit reached"}"#).unwrap();

        assert_eq!(outcome.error(), Some("Daily limit reached"));
        assert!(outcome.post.is_none());
        assert!(outcome.paraphrased.is_none());
    }

    /// Test: empty error string counts as no error.
    #[test]
    fn test_paraphrase_outcome_empty_error_is_none() {
        let outcome: ParaphraseOutcome = serde_json::from_str(r#"{"error": ""}"#).unwrap();
        assert!(outcome.error().is_none());
    }

    /// Test: subscription with missing fields deserializes to defaults.
    #[test]
    fn test_subscription_details_partial() {
        let details: SubscriptionDetails = serde_json::from_str("{}").unwrap();
        assert!(details.plan.is_none());
        assert!(!details.is_active());

        let details: SubscriptionDetails = serde_json::from_str(
            r#"{"status": "active", "plan": {"id": 1, "name": "Basic", "price": "9.99", "daily_limit": 20, "duration": 30}}"#,
        )
        .unwrap();
        assert!(details.is_active());
        assert_eq!(details.plan.unwrap().daily_limit, 20);
    }

    /// Test: recent post date falls back to published_at.
    #[test]
    fn test_recent_post_date_fallback() {
        let post: RecentPost = serde_json::from_str(
            r#"{"title": "A post", "published_at": "2025-04-01T12:00:00Z"}"#,
        )
        .unwrap();

        assert!(post.created_at.is_none());
        assert_eq!(post.date(), post.published_at);
    }

    /// Test: fetched post round-trips through serde.
    #[test]
    fn test_fetched_post_roundtrip() {
        let json = r#"{"id": 7, "title": "Title", "source": "https://blog.example/p/7", "created_at": "2025-03-01T08:30:00Z", "user": 3}"#;
        let post: FetchedPost = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, 7);

        let back = serde_json::to_string(&post).unwrap();
        let again: FetchedPost = serde_json::from_str(&back).unwrap();
        assert_eq!(again.source, "https://blog.example/p/7");
    }
}
