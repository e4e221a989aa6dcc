//! Configuration module for glimpse

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL (media host and default service root)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Posts service URL (defaults to `{backend_url}/api/posts`)
    #[serde(default)]
    pub posts_url: Option<String>,

    /// Likes service URL (defaults to `{backend_url}/api/likes`)
    #[serde(default)]
    pub likes_url: Option<String>,

    /// Users service URL (defaults to `{backend_url}/api/users`)
    #[serde(default)]
    pub users_url: Option<String>,

    /// Hosts in stored media URLs that should be rewritten to `backend_url`
    #[serde(default)]
    pub legacy_media_hosts: Vec<String>,

    /// Number of posts to fetch per request
    #[serde(default = "default_post_limit")]
    pub post_limit: usize,

    /// Feed tab shown on startup (following, explore, nearby)
    #[serde(default = "default_tab")]
    pub default_tab: String,

    /// Identity provider settings
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// OAuth/OIDC identity provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Issuer base URL (e.g. <https://tenant.eu.auth0.com>)
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// OAuth client id registered for this application
    #[serde(default)]
    pub client_id: String,

    /// API audience the access token is scoped to
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_backend_url() -> String {
    "http://localhost:5005".to_string()
}

fn default_post_limit() -> usize {
    50
}

fn default_tab() -> String {
    "explore".to_string()
}

fn default_issuer() -> String {
    "http://localhost:5006".to_string()
}

fn default_audience() -> String {
    "https://myapp-api".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            posts_url: None,
            likes_url: None,
            users_url: None,
            legacy_media_hosts: Vec::new(),
            post_limit: default_post_limit(),
            default_tab: default_tab(),
            identity: IdentityConfig::default(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            client_id: String::new(),
            audience: default_audience(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        crate::paths::config_path()
    }

    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Posts service URL, derived from the backend URL unless overridden
    pub fn posts_url(&self) -> String {
        self.posts_url
            .clone()
            .unwrap_or_else(|| format!("{}/api/posts", self.backend_url.trim_end_matches('/')))
    }

    /// Likes service URL, derived from the backend URL unless overridden
    pub fn likes_url(&self) -> String {
        self.likes_url
            .clone()
            .unwrap_or_else(|| format!("{}/api/likes", self.backend_url.trim_end_matches('/')))
    }

    /// Users service URL, derived from the backend URL unless overridden
    pub fn users_url(&self) -> String {
        self.users_url
            .clone()
            .unwrap_or_else(|| format!("{}/api/users", self.backend_url.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_urls_derived_from_backend() {
        let config = Config {
            backend_url: "https://api.example.com/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.posts_url(), "https://api.example.com/api/posts");
        assert_eq!(config.likes_url(), "https://api.example.com/api/likes");
        assert_eq!(config.users_url(), "https://api.example.com/api/users");
    }

    #[test]
    fn test_explicit_service_url_wins() {
        let config = Config {
            likes_url: Some("https://likes.example.com".to_string()),
            ..Config::default()
        };
        assert_eq!(config.likes_url(), "https://likes.example.com");
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.legacy_media_hosts = vec!["http://old-host:5005".to_string()];
        config.identity.client_id = "abc123".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.legacy_media_hosts, config.legacy_media_hosts);
        assert_eq!(loaded.identity.client_id, "abc123");
        assert_eq!(loaded.post_limit, 50);
    }
}
