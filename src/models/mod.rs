//! Data models

mod like;
mod post;
mod profile;

pub use like::LikeState;
pub use post::{Post, PostRecord};
pub use profile::{Profile, ProfileRecord, ProfileUpdate};
