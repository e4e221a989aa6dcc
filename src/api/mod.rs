//! Resource clients for the remote services
//!
//! Each client wraps one REST resource: construct the URL, attach the bearer
//! token from the session, perform the call, parse the JSON body. Network
//! errors, non-2xx statuses and malformed bodies all collapse into one
//! "request failed" error carrying the status and response text. No retry,
//! no backoff.

pub mod likes;
pub mod posts;
pub mod users;

pub use likes::{LikeAggregate, LikesApi, LikesClient};
pub use posts::{NewPost, PostsClient};
pub use users::UsersClient;

use anyhow::Result;
use reqwest::Response;

/// Fail a non-2xx response, keeping the status and body for display
pub(crate) async fn ensure_success(service: &str, response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("{service} service error {status}: {body}");
}
