//! Posts resource client

use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::multipart;
use std::path::PathBuf;

use crate::models::PostRecord;
use crate::session::Session;

use super::ensure_success;

/// A post upload drafted by the viewer
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Post title (required)
    pub title: String,
    /// Category tag (required)
    pub category: String,
    /// Body text
    pub bio: String,
    /// Media file to attach
    pub media: PathBuf,
}

/// Client for the posts resource
pub struct PostsClient {
    client: Client,
    base_url: String,
}

impl PostsClient {
    /// Create a client for the posts service
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full feed
    pub async fn list(&self) -> Result<Vec<PostRecord>> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .context("Failed to fetch posts")?;

        ensure_success("posts", response)
            .await?
            .json()
            .await
            .context("Failed to parse posts response")
    }

    /// Fetch the posts of one author
    pub async fn list_by_author(&self, author_id: &str) -> Result<Vec<PostRecord>> {
        let url = format!(
            "{}?authorId={}",
            self.base_url,
            urlencoding::encode(author_id)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch author posts")?;

        ensure_success("posts", response)
            .await?
            .json()
            .await
            .context("Failed to parse posts response")
    }

    /// Fetch a single post
    pub async fn get(&self, post_id: &str) -> Result<PostRecord> {
        let url = format!("{}/{}", self.base_url, post_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch post")?;

        ensure_success("posts", response)
            .await?
            .json()
            .await
            .context("Failed to parse post response")
    }

    /// Upload a new post (multipart: title, category, bio, media file)
    pub async fn create(&self, draft: &NewPost, session: &Session) -> Result<PostRecord> {
        let media = multipart::Part::bytes(
            tokio::fs::read(&draft.media)
                .await
                .with_context(|| format!("Failed to read media file {}", draft.media.display()))?,
        )
        .file_name(
            draft
                .media
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "upload".to_string()),
        );

        let form = multipart::Form::new()
            .text("title", draft.title.clone())
            .text("category", draft.category.clone())
            .text("bio", draft.bio.clone())
            .part("media", media);

        let response = self
            .client
            .post(&self.base_url)
            .header(
                "Authorization",
                format!("Bearer {}", session.access_token),
            )
            .multipart(form)
            .send()
            .await
            .context("Failed to upload post")?;

        ensure_success("posts", response)
            .await?
            .json()
            .await
            .context("Failed to parse upload response")
    }
}
