//! Like synchronizer
//!
//! Keeps an in-memory map from post id to [`LikeState`] in sync with the
//! likes resource, and lets the viewer toggle their own like with immediate
//! local feedback.
//!
//! Each post's toggle is an explicit little state machine: `Idle` until the
//! viewer toggles, `Pending` while the wire request is in flight (the control
//! stays disabled, so a second toggle cannot drift the count), then either
//! `Committed` (reconciled with the server's response) or `RolledBack` (the
//! optimistic flip reverted, error logged, no retry).

use std::collections::HashMap;

use futures::future::join_all;
use thiserror::Error;

use crate::api::{LikeAggregate, LikesApi};
use crate::models::LikeState;
use crate::session::Session;

/// Wire operation a toggle resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOp {
    /// The viewer is adding their like
    Add,
    /// The viewer is removing their like
    Remove,
}

/// How a toggle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the change; local state reconciled with its response
    Committed(LikeState),
    /// The request failed; the optimistic flip was reverted
    RolledBack,
}

/// Toggle rejections that happen before any network call
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToggleError {
    /// The viewer is not signed in (or has no provider id)
    #[error("sign in to like posts")]
    MissingViewer,
    /// A toggle for this post is already in flight
    #[error("a like update for this post is already in flight")]
    InFlight,
}

#[derive(Debug, Default)]
struct Entry {
    state: LikeState,
    /// Pre-flip state while a request is in flight; `Some` means Pending
    snapshot: Option<LikeState>,
}

/// In-memory like state for the visible posts
#[derive(Debug, Default)]
pub struct LikeSync {
    entries: HashMap<String, Entry>,
}

impl LikeSync {
    /// Create an empty synchronizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for a post (zero/unliked when never loaded)
    pub fn state(&self, post_id: &str) -> LikeState {
        self.entries
            .get(post_id)
            .map(|e| e.state)
            .unwrap_or_default()
    }

    /// Whether a state has ever been loaded or toggled for this post
    pub fn knows(&self, post_id: &str) -> bool {
        self.entries.contains_key(post_id)
    }

    /// Whether a toggle for this post is in flight (the control is disabled)
    pub fn is_pending(&self, post_id: &str) -> bool {
        self.entries
            .get(post_id)
            .is_some_and(|e| e.snapshot.is_some())
    }

    /// Merge freshly fetched states into the map
    ///
    /// Posts with a toggle in flight keep their optimistic state; the toggle
    /// response reconciles them instead.
    pub fn absorb(&mut self, states: HashMap<String, LikeState>) {
        for (post_id, state) in states {
            let entry = self.entries.entry(post_id).or_default();
            if entry.snapshot.is_none() {
                entry.state = state;
            }
        }
    }

    /// Fetch and merge like states for the given posts
    pub async fn load<A: LikesApi>(
        &mut self,
        api: &A,
        post_ids: &[String],
        session: Option<&Session>,
    ) {
        self.absorb(fetch_states(api, post_ids, session).await);
    }

    /// Start a toggle: validate, guard, and apply the optimistic flip
    ///
    /// Returns the wire operation to issue. No network traffic happens here;
    /// the caller performs the request and then calls [`Self::commit`] or
    /// [`Self::roll_back`].
    pub fn begin_toggle(
        &mut self,
        post_id: &str,
        viewer_id: &str,
    ) -> Result<ToggleOp, ToggleError> {
        if viewer_id.is_empty() {
            return Err(ToggleError::MissingViewer);
        }

        let entry = self.entries.entry(post_id.to_string()).or_default();
        if entry.snapshot.is_some() {
            return Err(ToggleError::InFlight);
        }

        let before = entry.state;
        let (op, after) = if before.liked {
            (ToggleOp::Remove, before.without_like())
        } else {
            (ToggleOp::Add, before.with_like())
        };

        entry.snapshot = Some(before);
        entry.state = after;
        Ok(op)
    }

    /// Finish a toggle by reconciling with the server's response
    pub fn commit(
        &mut self,
        post_id: &str,
        aggregate: &LikeAggregate,
        viewer_id: &str,
    ) -> LikeState {
        let state = state_from(aggregate, Some(viewer_id));
        let entry = self.entries.entry(post_id.to_string()).or_default();
        entry.snapshot = None;
        entry.state = state;
        state
    }

    /// Abort a toggle, reverting the optimistic flip
    pub fn roll_back(&mut self, post_id: &str) {
        if let Some(entry) = self.entries.get_mut(post_id)
            && let Some(before) = entry.snapshot.take()
        {
            entry.state = before;
        }
    }

    /// Toggle the viewer's like on a post
    ///
    /// Request failures are logged and absorbed into a rollback, never
    /// surfaced; awaited twice in sequence this restores the original state.
    pub async fn toggle<A: LikesApi>(
        &mut self,
        api: &A,
        session: &Session,
        post_id: &str,
    ) -> Result<ToggleOutcome, ToggleError> {
        let op = self.begin_toggle(post_id, &session.viewer_id)?;

        let result = match op {
            ToggleOp::Add => {
                api.add(post_id, &session.viewer_id, &session.access_token)
                    .await
            }
            ToggleOp::Remove => {
                api.remove(post_id, &session.viewer_id, &session.access_token)
                    .await
            }
        };

        match result {
            Ok(aggregate) => Ok(ToggleOutcome::Committed(self.commit(
                post_id,
                &aggregate,
                &session.viewer_id,
            ))),
            Err(e) => {
                tracing::error!("Like update failed for {post_id}: {e}");
                self.roll_back(post_id);
                Ok(ToggleOutcome::RolledBack)
            }
        }
    }
}

/// Fetch like states for a set of posts
///
/// Issues one batched read; posts the response does not cover default to
/// zero/unliked. If the batch request itself fails, falls back to per-post
/// reads so that one bad post cannot empty the whole page.
pub async fn fetch_states<A: LikesApi>(
    api: &A,
    post_ids: &[String],
    session: Option<&Session>,
) -> HashMap<String, LikeState> {
    let token = session.map(|s| s.access_token.as_str());
    let viewer = session.map(|s| s.viewer_id.as_str());

    match api.aggregate_many(post_ids, token).await {
        Ok(aggregates) => post_ids
            .iter()
            .map(|id| {
                let state = aggregates
                    .get(id)
                    .map(|agg| state_from(agg, viewer))
                    .unwrap_or_default();
                (id.clone(), state)
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Batched likes fetch failed, reading per post: {e}");
            fetch_states_each(api, post_ids, session).await
        }
    }
}

/// Fetch like states one post at a time, concurrently
///
/// Each post's failure is isolated: that entry defaults to zero/unliked and
/// the rest of the batch is unaffected. Errors are logged, not surfaced.
pub async fn fetch_states_each<A: LikesApi>(
    api: &A,
    post_ids: &[String],
    session: Option<&Session>,
) -> HashMap<String, LikeState> {
    let token = session.map(|s| s.access_token.as_str());
    let viewer = session.map(|s| s.viewer_id.as_str());

    let lookups = post_ids.iter().map(|id| async move {
        let result = api.aggregate(id, token).await;
        (id.clone(), result)
    });

    join_all(lookups)
        .await
        .into_iter()
        .map(|(id, result)| match result {
            Ok(aggregate) => {
                let state = state_from(&aggregate, viewer);
                (id, state)
            }
            Err(e) => {
                tracing::warn!("Likes fetch failed for {id}: {e}");
                (id, LikeState::default())
            }
        })
        .collect()
}

/// Compute a state from an aggregate: the viewer is `liked` iff they appear
/// in the likers list
fn state_from(aggregate: &LikeAggregate, viewer: Option<&str>) -> LikeState {
    let liked = viewer.is_some_and(|v| aggregate.likes.iter().any(|l| l.user_id == v));
    LikeState::new(aggregate.count, liked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::likes::Liker;
    use anyhow::{Result, anyhow};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory likes service
    #[derive(Default)]
    struct FakeLikes {
        /// post id -> liker user ids
        likers: Mutex<HashMap<String, Vec<String>>>,
        /// posts whose per-post read fails
        broken_posts: HashSet<String>,
        /// whether the batched read endpoint exists
        batch_supported: bool,
        /// whether writes fail
        broken_writes: bool,
        /// total wire calls observed
        calls: AtomicUsize,
    }

    impl FakeLikes {
        fn with_likers(likers: &[(&str, Vec<&str>)]) -> Self {
            let map = likers
                .iter()
                .map(|(post, users)| {
                    (
                        (*post).to_string(),
                        users.iter().map(|u| (*u).to_string()).collect(),
                    )
                })
                .collect();
            Self {
                likers: Mutex::new(map),
                batch_supported: true,
                ..Self::default()
            }
        }

        fn aggregate_of(&self, post_id: &str) -> LikeAggregate {
            let likers = self.likers.lock().unwrap();
            let users = likers.get(post_id).cloned().unwrap_or_default();
            LikeAggregate {
                count: users.len() as u32,
                likes: users
                    .into_iter()
                    .map(|user_id| Liker { user_id })
                    .collect(),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LikesApi for FakeLikes {
        async fn aggregate(&self, post_id: &str, _token: Option<&str>) -> Result<LikeAggregate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken_posts.contains(post_id) {
                return Err(anyhow!("boom"));
            }
            Ok(self.aggregate_of(post_id))
        }

        async fn aggregate_many(
            &self,
            post_ids: &[String],
            _token: Option<&str>,
        ) -> Result<HashMap<String, LikeAggregate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.batch_supported {
                return Err(anyhow!("404 not found"));
            }
            // Posts the service has never seen are absent from the response
            let present: Vec<String> = {
                let likers = self.likers.lock().unwrap();
                post_ids
                    .iter()
                    .filter(|id| likers.contains_key(id.as_str()))
                    .cloned()
                    .collect()
            };
            Ok(present
                .iter()
                .map(|id| (id.clone(), self.aggregate_of(id)))
                .collect())
        }

        async fn add(&self, post_id: &str, user_id: &str, _token: &str) -> Result<LikeAggregate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken_writes {
                return Err(anyhow!("boom"));
            }
            let mut likers = self.likers.lock().unwrap();
            let users = likers.entry(post_id.to_string()).or_default();
            if !users.iter().any(|u| u == user_id) {
                users.push(user_id.to_string());
            }
            drop(likers);
            Ok(self.aggregate_of(post_id))
        }

        async fn remove(
            &self,
            post_id: &str,
            user_id: &str,
            _token: &str,
        ) -> Result<LikeAggregate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken_writes {
                return Err(anyhow!("boom"));
            }
            let mut likers = self.likers.lock().unwrap();
            if let Some(users) = likers.get_mut(post_id) {
                users.retain(|u| u != user_id);
            }
            drop(likers);
            Ok(self.aggregate_of(post_id))
        }
    }

    fn session(viewer_id: &str) -> Session {
        Session {
            viewer_id: viewer_id.to_string(),
            access_token: "token".to_string(),
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|i| (*i).to_string()).collect()
    }

    #[tokio::test]
    async fn test_load_computes_liked_from_membership() {
        let api = FakeLikes::with_likers(&[("p1", vec!["alice", "bob"]), ("p2", vec!["bob"])]);
        let mut sync = LikeSync::new();

        sync.load(&api, &ids(&["p1", "p2"]), Some(&session("alice")))
            .await;

        assert_eq!(sync.state("p1"), LikeState::new(2, true));
        assert_eq!(sync.state("p2"), LikeState::new(1, false));
    }

    #[tokio::test]
    async fn test_load_liked_implies_count() {
        let api = FakeLikes::with_likers(&[("p1", vec!["alice"])]);
        let mut sync = LikeSync::new();

        sync.load(&api, &ids(&["p1"]), Some(&session("alice"))).await;

        let state = sync.state("p1");
        assert!(state.liked);
        assert!(state.count >= 1);
    }

    #[tokio::test]
    async fn test_per_post_failure_is_isolated() {
        let mut api = FakeLikes::with_likers(&[("p1", vec!["alice"]), ("p2", vec!["alice"])]);
        api.broken_posts.insert("p1".to_string());
        let viewer = session("alice");

        let states = fetch_states_each(&api, &ids(&["p1", "p2"]), Some(&viewer)).await;

        assert_eq!(states["p1"], LikeState::default());
        assert_eq!(states["p2"], LikeState::new(1, true));
    }

    #[tokio::test]
    async fn test_batch_failure_falls_back_to_per_post() {
        let mut api = FakeLikes::with_likers(&[("p1", vec!["bob"])]);
        api.batch_supported = false;
        let mut sync = LikeSync::new();

        sync.load(&api, &ids(&["p1"]), Some(&session("alice"))).await;

        assert_eq!(sync.state("p1"), LikeState::new(1, false));
        // one failed batch call plus one per-post read
        assert_eq!(api.call_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_defaults_missing_posts() {
        let api = FakeLikes::with_likers(&[("p1", vec!["bob"])]);
        let mut sync = LikeSync::new();

        sync.load(&api, &ids(&["p1", "p2"]), Some(&session("alice")))
            .await;

        assert_eq!(sync.state("p2"), LikeState::default());
        assert_eq!(api.call_count(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_viewer_is_never_liked() {
        let api = FakeLikes::with_likers(&[("p1", vec!["alice"])]);
        let mut sync = LikeSync::new();

        sync.load(&api, &ids(&["p1"]), None).await;

        assert_eq!(sync.state("p1"), LikeState::new(1, false));
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_original_state() {
        let api = FakeLikes::with_likers(&[("p1", vec!["bob"])]);
        let mut sync = LikeSync::new();
        let viewer = session("alice");

        sync.load(&api, &ids(&["p1"]), Some(&viewer)).await;
        let original = sync.state("p1");

        let first = sync.toggle(&api, &viewer, "p1").await.unwrap();
        assert_eq!(first, ToggleOutcome::Committed(LikeState::new(2, true)));

        let second = sync.toggle(&api, &viewer, "p1").await.unwrap();
        assert_eq!(second, ToggleOutcome::Committed(original));
        assert_eq!(sync.state("p1"), original);
    }

    #[tokio::test]
    async fn test_toggle_without_viewer_makes_no_network_call() {
        let api = FakeLikes::with_likers(&[("p1", vec![])]);
        let mut sync = LikeSync::new();

        let result = sync.toggle(&api, &session(""), "p1").await;

        assert_eq!(result, Err(ToggleError::MissingViewer));
        assert_eq!(api.call_count(), 0);
        assert_eq!(sync.state("p1"), LikeState::default());
    }

    #[tokio::test]
    async fn test_toggle_failure_rolls_back() {
        let mut api = FakeLikes::with_likers(&[("p1", vec!["bob"])]);
        api.broken_writes = true;
        let mut sync = LikeSync::new();
        let viewer = session("alice");

        sync.load(&api, &ids(&["p1"]), Some(&viewer)).await;
        let before = sync.state("p1");

        let outcome = sync.toggle(&api, &viewer, "p1").await.unwrap();

        assert_eq!(outcome, ToggleOutcome::RolledBack);
        assert_eq!(sync.state("p1"), before);
        assert!(!sync.is_pending("p1"));
    }

    #[test]
    fn test_pending_blocks_second_toggle() {
        let mut sync = LikeSync::new();

        let op = sync.begin_toggle("p1", "alice").unwrap();
        assert_eq!(op, ToggleOp::Add);
        assert!(sync.is_pending("p1"));
        assert_eq!(sync.state("p1"), LikeState::new(1, true));

        assert_eq!(sync.begin_toggle("p1", "alice"), Err(ToggleError::InFlight));

        sync.roll_back("p1");
        assert!(!sync.is_pending("p1"));
        assert_eq!(sync.state("p1"), LikeState::default());
    }

    #[test]
    fn test_absorb_keeps_pending_entries() {
        let mut sync = LikeSync::new();
        sync.begin_toggle("p1", "alice").unwrap();
        let optimistic = sync.state("p1");

        let mut fetched = HashMap::new();
        fetched.insert("p1".to_string(), LikeState::new(9, false));
        fetched.insert("p2".to_string(), LikeState::new(4, false));
        sync.absorb(fetched);

        assert_eq!(sync.state("p1"), optimistic);
        assert_eq!(sync.state("p2"), LikeState::new(4, false));
    }

    #[test]
    fn test_commit_reconciles_with_server() {
        let mut sync = LikeSync::new();
        sync.begin_toggle("p1", "alice").unwrap();

        // Server already had two other likers
        let aggregate = LikeAggregate {
            count: 3,
            likes: vec![
                Liker {
                    user_id: "alice".to_string(),
                },
                Liker {
                    user_id: "bob".to_string(),
                },
                Liker {
                    user_id: "carol".to_string(),
                },
            ],
        };
        let state = sync.commit("p1", &aggregate, "alice");

        assert_eq!(state, LikeState::new(3, true));
        assert!(!sync.is_pending("p1"));
    }
}
