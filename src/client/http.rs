//! REST client for the sentiment API (the pull sub-channel).

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use super::FetchApi;
use crate::error::SyncError;
use crate::model::{
    AnalyticsResponse, HealthResponse, NewPostRequest, Post, PostsResponse, SentimentLabel,
    WirePost,
};

/// Optional query filters for the posts listing.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub platform: Option<String>,
    pub sentiment: Option<SentimentLabel>,
}

pub struct ApiClient {
    base_url: String,
    filter: PostFilter,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String, timeout: Duration, filter: PostFilter) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("sentitui/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url,
            filter,
            client,
        }
    }

    pub async fn fetch_posts_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Post>, SyncError> {
        let url = format!("{}/api/posts", self.base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        if let Some(platform) = &self.filter.platform {
            query.push(("platform", platform.clone()));
        }
        if let Some(sentiment) = self.filter.sentiment {
            query.push(("sentiment", sentiment.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;

        let body: PostsResponse = response.json().await?;
        Ok(into_posts(body.posts))
    }

    pub async fn fetch_health(&self) -> Result<HealthResponse, SyncError> {
        let url = format!("{}/api/health", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn create_post(
        &self,
        content: String,
        author: String,
        platform: String,
    ) -> Result<Post, SyncError> {
        let url = format!("{}/api/posts", self.base_url);
        let body = NewPostRequest {
            content,
            author,
            platform,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let wire: WirePost = response.json().await?;
        wire.into_post(Utc::now())
    }
}

#[async_trait]
impl FetchApi for ApiClient {
    async fn fetch_posts(&self, limit: usize) -> Result<Vec<Post>, SyncError> {
        self.fetch_posts_page(limit, 0).await
    }

    async fn fetch_analytics(&self, hours: u32) -> Result<AnalyticsResponse, SyncError> {
        let url = format!("{}/api/analytics", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("hours", hours.to_string())])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

/// Convert a fetched page, dropping posts that fail validation.
fn into_posts(wire: Vec<WirePost>) -> Vec<Post> {
    let now = Utc::now();
    wire.into_iter()
        .filter_map(|p| match p.into_post(now) {
            Ok(post) => Some(post),
            Err(err) => {
                warn!(error = %err, "dropping invalid post from listing");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_listing_deserializes_and_validates() {
        let json = r#"{
            "posts": [
                {"post_id": 1, "content": "great launch", "author": "ada",
                 "platform": "bluesky",
                 "sentiment": {"label": "positive", "confidence": 0.97, "emotion": "joy"}},
                {"content": "no id, dropped"},
                {"post_id": 2, "content": "still processing"}
            ],
            "total": 3, "limit": 50, "offset": 0
        }"#;
        let body: PostsResponse = serde_json::from_str(json).unwrap();
        let posts = into_posts(body.posts);

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "1");
        assert_eq!(
            posts[0].sentiment.as_ref().unwrap().label,
            SentimentLabel::Positive
        );
        assert_eq!(posts[1].id, "2");
        assert!(posts[1].sentiment.is_none());
    }
}
