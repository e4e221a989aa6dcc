//! Feed assembly: raw post records to display-ready posts
//!
//! Everything here is pure. Media paths are resolved against the configured
//! backend, missing fields get defaults, and the assembled list is filtered
//! by the selected tab and category. Network fetching lives in [`crate::api`].

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::models::{Post, PostRecord};

/// Resolves stored media paths to absolute URLs
#[derive(Debug, Clone)]
pub struct MediaResolver {
    base_url: String,
    legacy_hosts: Vec<String>,
}

impl MediaResolver {
    /// Create a resolver for a backend base URL
    pub fn new(base_url: &str, legacy_hosts: Vec<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            legacy_hosts,
        }
    }

    /// Create a resolver from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.backend_url, config.legacy_media_hosts.clone())
    }

    /// Resolve a stored media path or URL to an absolute URL
    ///
    /// Relative paths live under the backend's /uploads/ directory. Absolute
    /// URLs pass through unchanged, except that known legacy hosts (old
    /// deployments baked into stored records) are rewritten to the current
    /// backend.
    pub fn resolve(&self, media_path: &str) -> Option<String> {
        if media_path.is_empty() {
            return None;
        }

        if media_path.starts_with("http") {
            for host in &self.legacy_hosts {
                if media_path.starts_with(host.as_str()) {
                    return Some(media_path.replacen(host.as_str(), &self.base_url, 1));
                }
            }
            return Some(media_path.to_string());
        }

        Some(format!("{}/uploads/{}", self.base_url, media_path))
    }

    fn resolve_opt(&self, media_path: Option<&str>) -> Option<String> {
        media_path.and_then(|p| self.resolve(p))
    }
}

/// Feed tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedTab {
    /// Posts from followed authors
    Following,
    /// Everything
    #[default]
    Explore,
    /// Posts tagged as nearby
    Nearby,
}

impl FeedTab {
    /// Get all tabs in display order
    pub const fn all() -> &'static [Self] {
        &[Self::Following, Self::Explore, Self::Nearby]
    }

    /// Get the display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Following => "Following",
            Self::Explore => "Explore",
            Self::Nearby => "Nearby",
        }
    }

    /// Cycle to the next tab
    pub const fn next(&self) -> Self {
        match self {
            Self::Following => Self::Explore,
            Self::Explore => Self::Nearby,
            Self::Nearby => Self::Following,
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "following" => Some(Self::Following),
            "explore" => Some(Self::Explore),
            "nearby" => Some(Self::Nearby),
            _ => None,
        }
    }

    /// Whether this tab admits the post, before any category filter
    fn admits(&self, post: &Post) -> bool {
        match self {
            Self::Following => post.is_followed,
            Self::Explore => true,
            Self::Nearby => post.tabs.iter().any(|t| t == "Nearby"),
        }
    }
}

/// Categories offered by the product (a post may carry any tag)
pub const CATEGORIES: &[&str] = &[
    "All",
    "Fashion",
    "Personal care",
    "Food",
    "Home",
    "Health",
    "Travel",
];

/// Map one wire record to the view model
pub fn assemble_one(record: PostRecord, resolver: &MediaResolver) -> Post {
    let created_at = record
        .created_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc));

    Post {
        id: record.id,
        title: record.title,
        author_name: record.author_name,
        author_avatar: resolver.resolve_opt(record.author_avatar.as_deref()),
        body: record.bio,
        media_url: resolver.resolve_opt(record.media_url.as_deref()),
        category: record.category,
        like_count: record.likes_count,
        comment_count: record.comments_count,
        created_at,
        is_followed: record.is_followed,
        tabs: record.tabs,
    }
}

/// Map a fetched feed to the view model
pub fn assemble(records: Vec<PostRecord>, resolver: &MediaResolver) -> Vec<Post> {
    records
        .into_iter()
        .map(|r| assemble_one(r, resolver))
        .collect()
}

/// Filter assembled posts by tab and category
///
/// `None` or `"All"` disables the category predicate; otherwise the category
/// must match exactly, stacked on whatever the tab admits.
pub fn filter(posts: &[Post], tab: FeedTab, category: Option<&str>) -> Vec<Post> {
    let category = category.filter(|c| !c.is_empty() && *c != "All");

    posts
        .iter()
        .filter(|post| {
            tab.admits(post) && category.is_none_or(|c| post.category == c)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, category: &str, followed: bool, tabs: &[&str]) -> Post {
        Post {
            id: id.to_string(),
            title: format!("post {id}"),
            author_name: "author".to_string(),
            author_avatar: None,
            body: String::new(),
            media_url: None,
            category: category.to_string(),
            like_count: 0,
            comment_count: 0,
            created_at: Utc::now(),
            is_followed: followed,
            tabs: tabs.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_resolve_relative_path() {
        let resolver = MediaResolver::new("https://api.example.com", Vec::new());
        assert_eq!(
            resolver.resolve("abc.jpg").as_deref(),
            Some("https://api.example.com/uploads/abc.jpg")
        );
    }

    #[test]
    fn test_resolve_absolute_unchanged() {
        let resolver = MediaResolver::new("https://api.example.com", Vec::new());
        assert_eq!(
            resolver.resolve("https://cdn.example.com/x.png").as_deref(),
            Some("https://cdn.example.com/x.png")
        );
    }

    #[test]
    fn test_resolve_rewrites_legacy_host() {
        let resolver = MediaResolver::new(
            "https://api.example.com",
            vec!["http://localhost:5005".to_string()],
        );
        assert_eq!(
            resolver.resolve("http://localhost:5005/uploads/x.png").as_deref(),
            Some("https://api.example.com/uploads/x.png")
        );
    }

    #[test]
    fn test_resolve_empty_is_none() {
        let resolver = MediaResolver::new("https://api.example.com", Vec::new());
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn test_explore_with_category_ignores_follow_status() {
        let posts = vec![
            post("1", "food", false, &[]),
            post("2", "art", true, &[]),
            post("3", "food", true, &[]),
        ];

        let filtered = filter(&posts, FeedTab::Explore, Some("food"));
        assert_eq!(ids(&filtered), vec!["1", "3"]);
    }

    #[test]
    fn test_following_stacks_category_on_follow() {
        let posts = vec![
            post("1", "food", false, &[]),
            post("2", "art", true, &[]),
            post("3", "food", true, &[]),
        ];

        let filtered = filter(&posts, FeedTab::Following, Some("food"));
        assert_eq!(ids(&filtered), vec!["3"]);

        let filtered = filter(&posts, FeedTab::Following, None);
        assert_eq!(ids(&filtered), vec!["2", "3"]);
    }

    #[test]
    fn test_all_category_disables_predicate() {
        let posts = vec![post("1", "food", false, &[]), post("2", "art", false, &[])];

        let filtered = filter(&posts, FeedTab::Explore, Some("All"));
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_nearby_requires_tab_membership() {
        let posts = vec![
            post("1", "food", true, &["Nearby"]),
            post("2", "food", true, &[]),
        ];

        let filtered = filter(&posts, FeedTab::Nearby, Some("food"));
        assert_eq!(ids(&filtered), vec!["1"]);
    }

    #[test]
    fn test_assemble_defaults_and_resolution() {
        let resolver = MediaResolver::new("https://api.example.com", Vec::new());
        let record: PostRecord = serde_json::from_str(
            r#"{"_id": "p1", "title": "Sunset", "mediaUrl": "sunset.jpg"}"#,
        )
        .unwrap();

        let post = assemble_one(record, &resolver);
        assert_eq!(post.id, "p1");
        assert_eq!(post.like_count, 0);
        assert_eq!(post.comment_count, 0);
        assert_eq!(post.author_avatar, None);
        assert_eq!(
            post.media_url.as_deref(),
            Some("https://api.example.com/uploads/sunset.jpg")
        );
    }
}
