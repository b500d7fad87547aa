//! Subscription endpoints.

use anyhow::{Context, Result};
use redraft_types::{Plan, SubscribeReceipt, SubscriptionDetails, UserActivity};
use serde_json::json;

use super::{ApiClient, read_json};

impl ApiClient {
    /// Current subscription state for the logged-in user.
    pub async fn subscription_details(&self) -> Result<SubscriptionDetails> {
        self.get_json("/api/subscription/details/").await
    }

    /// Publicly listed plans (no session required).
    pub async fn plans(&self) -> Result<Vec<Plan>> {
        let response = self
            .http
            .get(self.url("/api/subscription/plans"))
            .send()
            .await
            .context("Failed to fetch subscription plans")?;
        read_json(response).await
    }

    /// A single plan by id.
    pub async fn plan(&self, id: i64) -> Result<Plan> {
        self.get_json(&format!("/api/subscription/plans/{id}")).await
    }

    /// Subscribes to a plan. A payment URL on the receipt means checkout
    /// completes externally; its absence means the plan is already active.
    pub async fn subscribe(&self, plan_id: i64) -> Result<SubscribeReceipt> {
        self.post_json("/api/subscription/subscribe/", json!({ "plan_id": plan_id }))
            .await
    }

    /// The caller's daily usage records; the first entry is current.
    pub async fn user_activity(&self) -> Result<Vec<UserActivity>> {
        self.get_json("/api/details/").await
    }
}
