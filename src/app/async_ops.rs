//! Async operations for the TUI
//!
//! Uses channels to communicate between the sync TUI loop and async tasks.
//! The worker owns the resource clients and the session; the TUI owns the
//! like map and applies commits/rollbacks when results arrive.

use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::api::{LikeAggregate, LikesApi, LikesClient, NewPost, PostsClient, UsersClient};
use crate::config::Config;
use crate::feed::{self, MediaResolver};
use crate::likes::{self, ToggleOp};
use crate::models::{LikeState, Post, Profile, ProfileUpdate};
use crate::session::Session;

/// Commands sent from the TUI to the async worker
#[derive(Debug)]
pub enum AsyncCommand {
    /// Reload the feed and its like states
    RefreshFeed,
    /// Fetch a single post for the detail view
    FetchPost { post_id: String },
    /// Push an already-applied like toggle to the wire
    PushLike { post_id: String, op: ToggleOp },
    /// Upload a new post
    CreatePost { draft: NewPost },
    /// Load the viewer's profile and own posts
    LoadProfile,
    /// Save the viewer's profile
    SaveProfile { update: ProfileUpdate },
    /// Shutdown the worker
    Shutdown,
}

/// Results sent back from the async worker to the TUI
#[derive(Debug)]
pub enum AsyncResult {
    /// Feed reloaded
    FeedLoaded { posts: Vec<Post> },
    /// Like states fetched for the feed
    LikesLoaded { states: HashMap<String, LikeState> },
    /// Single post fetched
    PostLoaded { post: Box<Post> },
    /// The server accepted a like toggle
    LikeCommitted {
        post_id: String,
        aggregate: LikeAggregate,
    },
    /// A like toggle failed on the wire
    LikeFailed { post_id: String, message: String },
    /// Upload finished
    PostCreated { post: Box<Post> },
    /// Profile and own posts loaded
    ProfileLoaded {
        profile: Box<Profile>,
        posts: Vec<Post>,
    },
    /// Profile saved
    ProfileSaved { profile: Box<Profile> },
    /// An error occurred
    Error { message: String },
    /// Status message (for progress updates)
    Status { message: String },
}

/// Channel handles for communicating with the async worker
pub struct AsyncHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<AsyncCommand>,
    /// Receive results from the worker
    pub result_rx: mpsc::Receiver<AsyncResult>,
}

struct Worker {
    posts: PostsClient,
    likes: LikesClient,
    users: UsersClient,
    resolver: MediaResolver,
    session: Option<Session>,
    post_limit: usize,
    result_tx: mpsc::Sender<AsyncResult>,
}

/// Spawn the async worker and return handles
pub fn spawn_worker(config: &Config, session: Option<Session>) -> AsyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<AsyncCommand>(32);
    let (result_tx, result_rx) = mpsc::channel::<AsyncResult>(32);

    let worker = Worker {
        posts: PostsClient::new(&config.posts_url()),
        likes: LikesClient::new(&config.likes_url()),
        users: UsersClient::new(&config.users_url()),
        resolver: MediaResolver::from_config(config),
        session,
        post_limit: config.post_limit,
        result_tx,
    };

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                AsyncCommand::Shutdown => break,
                AsyncCommand::RefreshFeed => worker.handle_refresh().await,
                AsyncCommand::FetchPost { post_id } => worker.handle_fetch_post(&post_id).await,
                AsyncCommand::PushLike { post_id, op } => {
                    worker.handle_push_like(&post_id, op).await;
                }
                AsyncCommand::CreatePost { draft } => worker.handle_create(&draft).await,
                AsyncCommand::LoadProfile => worker.handle_load_profile().await,
                AsyncCommand::SaveProfile { update } => worker.handle_save_profile(&update).await,
            }
        }
    });

    AsyncHandle { cmd_tx, result_rx }
}

impl Worker {
    async fn send(&self, result: AsyncResult) {
        let _ = self.result_tx.send(result).await;
    }

    async fn handle_refresh(&self) {
        self.send(AsyncResult::Status {
            message: "Refreshing...".to_string(),
        })
        .await;

        let records = match self.posts.list().await {
            Ok(records) => records,
            Err(e) => {
                self.send(AsyncResult::Error {
                    message: e.to_string(),
                })
                .await;
                return;
            }
        };

        let mut posts = feed::assemble(records, &self.resolver);
        posts.truncate(self.post_limit);
        let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();

        self.send(AsyncResult::FeedLoaded { posts }).await;

        // Like failures degrade to defaults inside fetch_states; never fatal
        let states = likes::fetch_states(&self.likes, &post_ids, self.session.as_ref()).await;
        self.send(AsyncResult::LikesLoaded { states }).await;
    }

    async fn handle_fetch_post(&self, post_id: &str) {
        match self.posts.get(post_id).await {
            Ok(record) => {
                let post = feed::assemble_one(record, &self.resolver);
                self.send(AsyncResult::PostLoaded {
                    post: Box::new(post),
                })
                .await;
            }
            Err(e) => {
                self.send(AsyncResult::Error {
                    message: e.to_string(),
                })
                .await;
            }
        }
    }

    async fn handle_push_like(&self, post_id: &str, op: ToggleOp) {
        let Some(session) = &self.session else {
            self.send(AsyncResult::LikeFailed {
                post_id: post_id.to_string(),
                message: "Sign in to like posts".to_string(),
            })
            .await;
            return;
        };

        let result = match op {
            ToggleOp::Add => {
                self.likes
                    .add(post_id, &session.viewer_id, &session.access_token)
                    .await
            }
            ToggleOp::Remove => {
                self.likes
                    .remove(post_id, &session.viewer_id, &session.access_token)
                    .await
            }
        };

        match result {
            Ok(aggregate) => {
                self.send(AsyncResult::LikeCommitted {
                    post_id: post_id.to_string(),
                    aggregate,
                })
                .await;
            }
            Err(e) => {
                self.send(AsyncResult::LikeFailed {
                    post_id: post_id.to_string(),
                    message: e.to_string(),
                })
                .await;
            }
        }
    }

    async fn handle_create(&self, draft: &NewPost) {
        let Some(session) = &self.session else {
            self.send(AsyncResult::Error {
                message: "Sign in to upload posts".to_string(),
            })
            .await;
            return;
        };

        self.send(AsyncResult::Status {
            message: "Uploading...".to_string(),
        })
        .await;

        match self.posts.create(draft, session).await {
            Ok(record) => {
                let post = feed::assemble_one(record, &self.resolver);
                self.send(AsyncResult::PostCreated {
                    post: Box::new(post),
                })
                .await;
            }
            Err(e) => {
                self.send(AsyncResult::Error {
                    message: e.to_string(),
                })
                .await;
            }
        }
    }

    async fn handle_load_profile(&self) {
        let Some(session) = &self.session else {
            self.send(AsyncResult::Error {
                message: "Sign in to view your profile".to_string(),
            })
            .await;
            return;
        };

        let record = match self.users.fetch(&session.viewer_id, session).await {
            Ok(record) => record,
            Err(e) => {
                self.send(AsyncResult::Error {
                    message: e.to_string(),
                })
                .await;
                return;
            }
        };

        let profile = Profile {
            id: session.viewer_id.clone(),
            name: record.name,
            bio: record.bio,
            avatar_url: record
                .profile_picture
                .as_deref()
                .and_then(|p| self.resolver.resolve(p)),
        };

        // The viewer's own posts are non-essential here; degrade to empty
        let posts = match self.posts.list_by_author(&session.viewer_id).await {
            Ok(records) => feed::assemble(records, &self.resolver),
            Err(e) => {
                tracing::warn!("Failed to fetch own posts: {e}");
                Vec::new()
            }
        };

        self.send(AsyncResult::ProfileLoaded {
            profile: Box::new(profile),
            posts,
        })
        .await;
    }

    async fn handle_save_profile(&self, update: &ProfileUpdate) {
        let Some(session) = &self.session else {
            self.send(AsyncResult::Error {
                message: "Sign in to edit your profile".to_string(),
            })
            .await;
            return;
        };

        match self.users.update(&session.viewer_id, update, session).await {
            Ok(record) => {
                let profile = Profile {
                    id: session.viewer_id.clone(),
                    name: record.name,
                    bio: record.bio,
                    avatar_url: record
                        .profile_picture
                        .as_deref()
                        .and_then(|p| self.resolver.resolve(p)),
                };
                self.send(AsyncResult::ProfileSaved {
                    profile: Box::new(profile),
                })
                .await;
            }
            Err(e) => {
                self.send(AsyncResult::Error {
                    message: e.to_string(),
                })
                .await;
            }
        }
    }
}
