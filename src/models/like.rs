//! Per-post like state for the current viewer

use serde::{Deserialize, Serialize};

/// Like state of one post as seen by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LikeState {
    /// Aggregate like count
    pub count: u32,
    /// Whether the viewer is among the likers
    pub liked: bool,
}

impl LikeState {
    /// Build a state, normalizing the count so that `liked` implies a count
    /// of at least one (a liker the server knows about is part of the count)
    pub fn new(count: u32, liked: bool) -> Self {
        let count = if liked { count.max(1) } else { count };
        Self { count, liked }
    }

    /// The state with the viewer's like added
    pub fn with_like(self) -> Self {
        Self::new(self.count.saturating_add(1), true)
    }

    /// The state with the viewer's like removed
    pub fn without_like(self) -> Self {
        Self {
            count: self.count.saturating_sub(1),
            liked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liked_implies_positive_count() {
        let state = LikeState::new(0, true);
        assert_eq!(state.count, 1);

        let state = LikeState::new(7, true);
        assert_eq!(state.count, 7);
    }

    #[test]
    fn test_flip_round_trip() {
        let original = LikeState::new(3, false);
        assert_eq!(original.with_like().without_like(), original);
    }
}
