//! Viewer profile model

use serde::{Deserialize, Serialize};

/// A user profile as displayed and edited by the viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Opaque provider-issued user id
    pub id: String,
    /// Display name
    pub name: String,
    /// Bio text
    pub bio: String,
    /// Avatar URL (resolved, absolute)
    pub avatar_url: Option<String>,
}

/// A profile as the users service returns it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Bio text
    #[serde(default)]
    pub bio: String,
    /// Avatar URL or relative path
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Request body for a whole-record profile save
///
/// The users service replaces the stored record with this body; partial
/// updates are not supported, so callers send every field.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    /// Provider-issued subject of the record owner
    #[serde(rename = "auth0Id")]
    pub subject: String,
    /// Display name
    pub name: String,
    /// Bio text
    pub bio: String,
    /// Avatar URL
    #[serde(rename = "profilePicture")]
    pub avatar_url: Option<String>,
}

impl Profile {
    /// Build the whole-record update body for saving this profile
    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            subject: self.id.clone(),
            name: self.name.clone(),
            bio: self.bio.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}
