//! Post model: wire record and assembled view model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post as the posts service returns it
///
/// Older deployments emit the raw document id as `_id`; both spellings are
/// accepted. Counters and flags are optional on the wire and default to
/// empty/zero here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// Server-issued post id
    #[serde(alias = "_id")]
    pub id: String,
    /// Post title
    #[serde(default)]
    pub title: String,
    /// Author display name
    #[serde(default)]
    pub author_name: String,
    /// Author avatar URL or relative path
    #[serde(default)]
    pub author_avatar: Option<String>,
    /// Body text
    #[serde(default)]
    pub bio: String,
    /// Media URL or relative upload path
    #[serde(default)]
    pub media_url: Option<String>,
    /// Category tag
    #[serde(default)]
    pub category: String,
    /// Aggregate like count at fetch time
    #[serde(default)]
    pub likes_count: u32,
    /// Aggregate comment count at fetch time
    #[serde(default)]
    pub comments_count: u32,
    /// Creation timestamp (RFC 3339)
    #[serde(default)]
    pub created_at: Option<String>,
    /// Whether the viewer follows the author
    #[serde(default)]
    pub is_followed: bool,
    /// Feed tabs this post belongs to (e.g. "Nearby")
    #[serde(default)]
    pub tabs: Vec<String>,
}

/// An assembled post ready for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Server-issued post id
    pub id: String,
    /// Post title
    pub title: String,
    /// Author display name
    pub author_name: String,
    /// Author avatar URL (resolved, absolute)
    pub author_avatar: Option<String>,
    /// Body text
    pub body: String,
    /// Media URL (resolved, absolute)
    pub media_url: Option<String>,
    /// Category tag
    pub category: String,
    /// Number of likes
    pub like_count: u32,
    /// Number of comments
    pub comment_count: u32,
    /// When the post was created
    pub created_at: DateTime<Utc>,
    /// Whether the viewer follows the author
    pub is_followed: bool,
    /// Feed tabs this post belongs to
    pub tabs: Vec<String>,
}

impl Post {
    /// Get a short preview of the body (for list display)
    pub fn preview(&self, max_len: usize) -> String {
        let body = self.body.replace('\n', " ");
        if body.len() <= max_len {
            body
        } else {
            format!("{}...", &body[..max_len.saturating_sub(3)])
        }
    }

    /// Get relative time string (e.g., "5m", "2h", "3d")
    pub fn relative_time(&self) -> String {
        let now = Utc::now();
        let duration = now.signed_duration_since(self.created_at);

        if duration.num_seconds() < 60 {
            format!("{}s", duration.num_seconds())
        } else if duration.num_minutes() < 60 {
            format!("{}m", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h", duration.num_hours())
        } else if duration.num_days() < 7 {
            format!("{}d", duration.num_days())
        } else {
            self.created_at.format("%b %d").to_string()
        }
    }
}
