//! Likes resource client

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ensure_success;

/// Like aggregate for one post: the count plus who the likers are
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LikeAggregate {
    /// Aggregate like count
    #[serde(default)]
    pub count: u32,
    /// The likers (the viewer computes their own flag from membership)
    #[serde(default)]
    pub likes: Vec<Liker>,
}

/// One liker entry in an aggregate
#[derive(Debug, Clone, Deserialize)]
pub struct Liker {
    /// Provider-issued user id
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
struct LikeBody<'a> {
    #[serde(rename = "postId")]
    post_id: &'a str,
    #[serde(rename = "userId")]
    user_id: &'a str,
}

/// Likes resource operations
///
/// The trait seam lets the like synchronizer run against an in-memory fake
/// in tests; [`LikesClient`] is the wire implementation.
#[allow(async_fn_in_trait)]
pub trait LikesApi {
    /// Read the aggregate for one post
    async fn aggregate(&self, post_id: &str, token: Option<&str>) -> Result<LikeAggregate>;

    /// Read aggregates for a set of posts in one request
    async fn aggregate_many(
        &self,
        post_ids: &[String],
        token: Option<&str>,
    ) -> Result<HashMap<String, LikeAggregate>>;

    /// Add the viewer's like to a post
    async fn add(&self, post_id: &str, user_id: &str, token: &str) -> Result<LikeAggregate>;

    /// Remove the viewer's like from a post
    async fn remove(&self, post_id: &str, user_id: &str, token: &str) -> Result<LikeAggregate>;
}

/// Client for the likes resource
pub struct LikesClient {
    client: Client,
    base_url: String,
}

impl LikesClient {
    /// Create a client for the likes service
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn bearer(
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }
}

impl LikesApi for LikesClient {
    async fn aggregate(&self, post_id: &str, token: Option<&str>) -> Result<LikeAggregate> {
        let url = format!("{}/{}", self.base_url, post_id);

        let response = Self::bearer(self.client.get(&url), token)
            .send()
            .await
            .context("Failed to fetch likes")?;

        ensure_success("likes", response)
            .await?
            .json()
            .await
            .context("Failed to parse likes response")
    }

    async fn aggregate_many(
        &self,
        post_ids: &[String],
        token: Option<&str>,
    ) -> Result<HashMap<String, LikeAggregate>> {
        let url = format!("{}?postIds={}", self.base_url, post_ids.join(","));

        let response = Self::bearer(self.client.get(&url), token)
            .send()
            .await
            .context("Failed to fetch likes")?;

        ensure_success("likes", response)
            .await?
            .json()
            .await
            .context("Failed to parse likes response")
    }

    async fn add(&self, post_id: &str, user_id: &str, token: &str) -> Result<LikeAggregate> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {token}"))
            .json(&LikeBody { post_id, user_id })
            .send()
            .await
            .context("Failed to add like")?;

        ensure_success("likes", response)
            .await?
            .json()
            .await
            .context("Failed to parse like response")
    }

    async fn remove(&self, post_id: &str, user_id: &str, token: &str) -> Result<LikeAggregate> {
        let response = self
            .client
            .delete(&self.base_url)
            .header("Authorization", format!("Bearer {token}"))
            .json(&LikeBody { post_id, user_id })
            .send()
            .await
            .context("Failed to remove like")?;

        ensure_success("likes", response)
            .await?
            .json()
            .await
            .context("Failed to parse like response")
    }
}
