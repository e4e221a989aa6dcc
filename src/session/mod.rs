//! Session and identity adapter
//!
//! Wraps the external OAuth/OIDC provider. A [`Session`] carries the viewer
//! id and a short-lived bearer token; it is established per run via silent
//! refresh of the stored grant and passed explicitly into every resource
//! client call. There is no ambient auth state.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::auth;
use crate::config::IdentityConfig;

/// An authenticated viewer session
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque provider-issued viewer id (the token subject)
    pub viewer_id: String,
    /// Short-lived bearer token for resource requests
    pub access_token: String,
}

/// Token response from the provider's token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Access token for API requests
    pub access_token: String,
    /// Refresh token for silent renewal (rotated by some providers)
    pub refresh_token: Option<String>,
    /// Token type (usually "Bearer")
    pub token_type: String,
}

/// Viewer identity claims from the provider's userinfo endpoint
#[derive(Debug, Deserialize)]
pub struct UserInfo {
    /// Opaque subject id
    pub sub: String,
    /// Display name claim
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar URL claim
    #[serde(default)]
    pub picture: Option<String>,
}

/// Client for the OAuth/OIDC identity provider
pub struct IdentityClient {
    client: Client,
    issuer: String,
    client_id: String,
    audience: String,
}

const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

impl IdentityClient {
    /// Create a client for the configured provider
    pub fn new(identity: &IdentityConfig) -> Self {
        Self {
            client: Client::new(),
            issuer: identity.issuer.trim_end_matches('/').to_string(),
            client_id: identity.client_id.clone(),
            audience: identity.audience.clone(),
        }
    }

    /// Get the authorization URL for the viewer to visit
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/authorize?client_id={}&redirect_uri={}&response_type=code&scope=openid+profile+offline_access&audience={}",
            self.issuer,
            self.client_id,
            urlencoding::encode(REDIRECT_URI),
            urlencoding::encode(&self.audience),
        )
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let url = format!("{}/oauth/token", self.issuer);

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.client_id),
            ("redirect_uri", REDIRECT_URI),
            ("code", code),
            ("audience", &self.audience),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .context("Failed to exchange authorization code")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("identity provider error {status}: {body}");
        }

        response
            .json()
            .await
            .context("Failed to parse token response")
    }

    /// Silently refresh an expired session
    ///
    /// Fails when the grant itself has expired or been revoked; the caller
    /// treats the viewer as unauthenticated in that case.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let url = format!("{}/oauth/token", self.issuer);

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", &self.client_id),
            ("refresh_token", refresh_token),
            ("audience", &self.audience),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .context("Failed to refresh session")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("identity provider error {status}: {body}");
        }

        response
            .json()
            .await
            .context("Failed to parse token response")
    }

    /// Fetch the viewer's identity claims
    pub async fn userinfo(&self, access_token: &str) -> Result<UserInfo> {
        let url = format!("{}/userinfo", self.issuer);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await
            .context("Failed to fetch userinfo")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("identity provider error {status}: {body}");
        }

        response
            .json()
            .await
            .context("Failed to parse userinfo response")
    }
}

/// Establish a session from the stored grant, if any
///
/// Returns `None` when no grant is stored or the silent refresh fails; the
/// viewer browses anonymously in that case. Refresh failures are logged, not
/// surfaced.
pub async fn establish(identity: &IdentityConfig) -> Option<Session> {
    let stored = match auth::load_grant() {
        Ok(Some(grant)) => grant,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Failed to read stored credentials: {e}");
            return None;
        }
    };

    let client = IdentityClient::new(identity);
    match client.refresh(&stored.refresh_token).await {
        Ok(tokens) => {
            // Providers that rotate refresh tokens hand back a new one
            if let Some(rotated) = &tokens.refresh_token
                && *rotated != stored.refresh_token
                && let Err(e) = auth::store_grant(&auth::Grant {
                    viewer_id: stored.viewer_id.clone(),
                    refresh_token: rotated.clone(),
                })
            {
                tracing::warn!("Failed to persist rotated refresh token: {e}");
            }

            Some(Session {
                viewer_id: stored.viewer_id,
                access_token: tokens.access_token,
            })
        }
        Err(e) => {
            tracing::warn!("Session expired, continuing unauthenticated: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_shape() {
        let identity = IdentityConfig {
            issuer: "https://id.example.com/".to_string(),
            client_id: "client123".to_string(),
            audience: "https://myapp-api".to_string(),
        };
        let url = IdentityClient::new(&identity).authorize_url();

        assert!(url.starts_with("https://id.example.com/authorize?"));
        assert!(url.contains("client_id=client123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("audience=https%3A%2F%2Fmyapp-api"));
    }
}
