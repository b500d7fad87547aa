//! Post endpoints: pulling from the user's blog, history, publish, drafts.

use std::collections::BTreeMap;

use anyhow::Result;
use redraft_types::{BlogPost, FetchedPost, RecentPost};
use serde_json::json;

use super::{ApiClient, check_status};
use crate::transport::ApiRequest;

impl ApiClient {
    /// Asks the backend to pull fresh posts from the user's blog.
    ///
    /// The wire shape is a title → url map; it is flattened into a list
    /// ordered by title.
    pub async fn fetch_news(&self) -> Result<Vec<BlogPost>> {
        let map: BTreeMap<String, String> = self.get_json("/api/fetch-news/").await?;
        Ok(map
            .into_iter()
            .map(|(title, url)| BlogPost {
                title,
                url,
            })
            .collect())
    }

    /// Posts previously pulled from the user's blog.
    pub async fn fetched_posts(&self) -> Result<Vec<FetchedPost>> {
        self.get_json("/api/fetched").await
    }

    /// Recently published posts on the user's blog.
    pub async fn recent_posts(&self) -> Result<Vec<RecentPost>> {
        self.get_json("/api/recent-posts/").await
    }

    /// Posts already published through Redraft.
    pub async fn posted(&self) -> Result<Vec<RecentPost>> {
        self.get_json("/api/posted/").await
    }

    /// Publishes edited content to WordPress through the backend.
    pub async fn publish(&self, title: &str, content: &str, url: &str) -> Result<()> {
        let request = ApiRequest::post(
            self.url("/api/publish/"),
            json!({ "content": content, "title": title, "url": url }),
        );
        let response = self.transport.fetch_authenticated(request).await?;
        check_status(response).await?;
        Ok(())
    }

    /// Saves edited content as a WordPress draft.
    pub async fn save_draft(&self, title: &str, content: &str, url: &str) -> Result<()> {
        let request = ApiRequest::post(
            self.url("/api/save-draft/"),
            json!({ "content": content, "title": title, "url": url }),
        );
        let response = self.transport.fetch_authenticated(request).await?;
        check_status(response).await?;
        Ok(())
    }
}
