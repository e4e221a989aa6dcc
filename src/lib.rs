//! # glimpse 🔭
//!
//! A terminal client for self-hosted photo-sharing networks.
//!
//! ## Overview
//!
//! glimpse talks to a small photo-sharing backend (posts, likes and users
//! services behind an OAuth/OIDC identity provider) and lets you browse the
//! feed, upload posts, like them and edit your profile from the terminal.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          App                                │
//! │  Orchestrates all components and runs the main event loop   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Session     │ │       API       │ │      Feed       │
//! │                 │ │                 │ │                 │
//! │ • OIDC refresh  │ │ • Posts         │ │ • Assemble      │
//! │ • Viewer id     │ │ • Likes         │ │ • Media URLs    │
//! │ • Bearer token  │ │ • Users         │ │ • Tab filter    │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │                   │
//!          └───────────────────┴───────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │      Likes      │ │      Auth       │ │     Models      │
//! │                 │ │                 │ │                 │
//! │ • Like map      │ │ • Grant store   │ │ • Post          │
//! │ • Optimistic    │ │ • AES-GCM file  │ │ • Profile       │
//! │   toggle        │ │                 │ │ • LikeState     │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] — Resource clients (posts, likes, users)
//! - [`app`] — TUI application state and event loop
//! - [`auth`] — Encrypted identity-grant storage
//! - [`config`] — Configuration management
//! - [`feed`] — Feed assembly and filtering
//! - [`likes`] — Optimistic like synchronization
//! - [`models`] — Data models (Post, Profile, LikeState)
//! - [`qr`] — Profile share payload
//! - [`session`] — OAuth/OIDC session adapter
//!
//! ## Example
//!
//! ```no_run
//! use glimpse::app;
//!
//! fn main() -> anyhow::Result<()> {
//!     app::run()
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::similar_names)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod feed;
pub mod likes;
pub mod models;
pub mod paths;
pub mod qr;
pub mod session;

// Re-export main types for convenience
pub use app::AppState;
pub use config::Config;
pub use feed::{FeedTab, MediaResolver};
pub use likes::LikeSync;
pub use models::{LikeState, Post, Profile};
pub use session::Session;

/// ASCII logo for the application
pub const LOGO: &str = r"
       ___
  ___ _/ (_)_ _  ___  ___ ___
 / _ `/ / /  ' \/ _ \(_-</ -_)
 \_, /_/_/_/_/_/ .__/___/\__/
/___/         /_/
";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
