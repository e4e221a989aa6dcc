//! Profile sharing payload
//!
//! The product shares profiles by embedding a small JSON card in a QR code;
//! scanning clients parse the card and open the profile URL.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// The payload embedded in a profile QR code
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareCard {
    /// Provider-issued user id
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Web URL of the profile
    pub profile_url: String,
}

impl ShareCard {
    /// Build a share card for a viewer
    pub fn new(user_id: &str, name: &str, base_url: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: name.to_string(),
            profile_url: profile_url(base_url, user_id),
        }
    }

    /// The JSON payload to encode
    pub fn payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Web URL of a user's profile page
pub fn profile_url(base_url: &str, user_id: &str) -> String {
    format!(
        "{}/profile/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(user_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_fields() {
        let card = ShareCard::new("auth0|123", "Ada", "https://social.example.com");
        let payload = card.payload().unwrap();

        assert!(payload.contains(r#""userId":"auth0|123""#));
        assert!(payload.contains(r#""name":"Ada""#));
        assert!(
            payload.contains(r#""profileUrl":"https://social.example.com/profile/auth0%7C123""#)
        );
    }

    #[test]
    fn test_round_trip() {
        let card = ShareCard::new("u1", "Ada", "https://social.example.com");
        let parsed: ShareCard = serde_json::from_str(&card.payload().unwrap()).unwrap();
        assert_eq!(parsed.user_id, "u1");
        assert_eq!(parsed.profile_url, "https://social.example.com/profile/u1");
    }
}
