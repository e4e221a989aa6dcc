//! Users (profile) resource client

use anyhow::{Context, Result};
use reqwest::Client;

use crate::models::{ProfileRecord, ProfileUpdate};
use crate::session::Session;

use super::ensure_success;

/// Client for the users resource
pub struct UsersClient {
    client: Client,
    base_url: String,
}

impl UsersClient {
    /// Create a client for the users service
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    // Provider subjects contain characters like '|' and must be encoded
    fn user_url(&self, user_id: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(user_id))
    }

    /// Fetch a user's profile record
    pub async fn fetch(&self, user_id: &str, session: &Session) -> Result<ProfileRecord> {
        let response = self
            .client
            .get(self.user_url(user_id))
            .header(
                "Authorization",
                format!("Bearer {}", session.access_token),
            )
            .send()
            .await
            .context("Failed to fetch profile")?;

        ensure_success("users", response)
            .await?
            .json()
            .await
            .context("Failed to parse profile response")
    }

    /// Replace a user's profile record
    pub async fn update(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
        session: &Session,
    ) -> Result<ProfileRecord> {
        let response = self
            .client
            .put(self.user_url(user_id))
            .header(
                "Authorization",
                format!("Bearer {}", session.access_token),
            )
            .json(update)
            .send()
            .await
            .context("Failed to update profile")?;

        ensure_success("users", response)
            .await?
            .json()
            .await
            .context("Failed to parse profile response")
    }
}
