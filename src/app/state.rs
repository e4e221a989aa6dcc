//! Application state

use crate::api::NewPost;
use crate::config::Config;
use crate::feed::{self, CATEGORIES, FeedTab};
use crate::likes::LikeSync;
use crate::models::{Post, Profile};
use crate::session::Session;

/// Current view (the product's pages)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// The home feed
    #[default]
    Feed,
    /// A single post
    Detail,
    /// Upload form
    Compose,
    /// The viewer's profile
    Profile,
    /// Profile edit form
    EditProfile,
    /// Profile share card (QR payload)
    Share,
    /// Keybinding help
    Help,
}

/// Focused field of the compose form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeField {
    #[default]
    Title,
    Category,
    Bio,
    Media,
}

impl ComposeField {
    pub const fn next(self) -> Self {
        match self {
            Self::Title => Self::Category,
            Self::Category => Self::Bio,
            Self::Bio => Self::Media,
            Self::Media => Self::Title,
        }
    }
}

/// The upload form
#[derive(Debug, Default)]
pub struct ComposeForm {
    pub title: String,
    pub category_index: usize,
    pub bio: String,
    pub media_path: String,
    pub field: ComposeField,
}

impl ComposeForm {
    /// Selected category name
    pub fn category(&self) -> &'static str {
        // Skip the "All" pseudo-category
        CATEGORIES[1..][self.category_index % (CATEGORIES.len() - 1)]
    }

    /// Cycle the category selection
    pub fn next_category(&mut self) {
        self.category_index = (self.category_index + 1) % (CATEGORIES.len() - 1);
    }

    /// Validate required fields and build the upload draft
    pub fn validate(&self) -> Result<NewPost, String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        if self.bio.trim().is_empty() {
            return Err("Tell the story behind this post".to_string());
        }
        if self.media_path.trim().is_empty() {
            return Err("Select a media file".to_string());
        }
        Ok(NewPost {
            title: self.title.trim().to_string(),
            category: self.category().to_string(),
            bio: self.bio.trim().to_string(),
            media: self.media_path.trim().into(),
        })
    }

    /// Mutable text buffer of the focused field, if it is a text field
    pub fn active_text(&mut self) -> Option<&mut String> {
        match self.field {
            ComposeField::Title => Some(&mut self.title),
            ComposeField::Bio => Some(&mut self.bio),
            ComposeField::Media => Some(&mut self.media_path),
            ComposeField::Category => None,
        }
    }
}

/// Focused field of the profile edit form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditField {
    #[default]
    Name,
    Bio,
    Avatar,
}

impl EditField {
    pub const fn next(self) -> Self {
        match self {
            Self::Name => Self::Bio,
            Self::Bio => Self::Avatar,
            Self::Avatar => Self::Name,
        }
    }
}

/// The profile edit form
#[derive(Debug, Default)]
pub struct EditForm {
    pub name: String,
    pub bio: String,
    pub avatar: String,
    pub field: EditField,
}

impl EditForm {
    /// Prefill from the loaded profile
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            bio: profile.bio.clone(),
            avatar: profile.avatar_url.clone().unwrap_or_default(),
            field: EditField::default(),
        }
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Display name is required".to_string());
        }
        Ok(())
    }

    /// Mutable text buffer of the focused field
    pub fn active_text(&mut self) -> Option<&mut String> {
        match self.field {
            EditField::Name => Some(&mut self.name),
            EditField::Bio => Some(&mut self.bio),
            EditField::Avatar => Some(&mut self.avatar),
        }
    }
}

/// Application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Established viewer session, if signed in
    pub session: Option<Session>,
    /// Whether to quit
    pub should_quit: bool,
    /// Current view
    pub view: View,

    /// Selected feed tab
    pub tab: FeedTab,
    /// Selected category index into [`CATEGORIES`]
    pub category_index: usize,
    /// All assembled posts
    pub posts: Vec<Post>,
    /// Posts visible under the current tab/category filter
    pub visible: Vec<Post>,
    /// Selected index into `visible`
    pub selected_post: usize,
    /// Like state for visible posts
    pub likes: LikeSync,

    /// Post shown in the detail view
    pub detail: Option<Post>,
    /// Scroll offset of the detail view
    pub detail_scroll: usize,

    /// The viewer's profile, once loaded
    pub profile: Option<Profile>,
    /// The viewer's own posts
    pub my_posts: Vec<Post>,

    /// Upload form
    pub compose: ComposeForm,
    /// Profile edit form
    pub edit: EditForm,

    /// Status message (bottom bar)
    pub status: String,
    /// Is loading?
    pub loading: bool,

    /// Tick counter for animations
    tick: u64,
}

impl AppState {
    /// Create a new app state
    pub fn new(config: Config, session: Option<Session>) -> Self {
        let tab = FeedTab::from_str(&config.default_tab).unwrap_or_default();

        Self {
            config,
            session,
            should_quit: false,
            view: View::Feed,
            tab,
            category_index: 0,
            posts: Vec::new(),
            visible: Vec::new(),
            selected_post: 0,
            likes: LikeSync::new(),
            detail: None,
            detail_scroll: 0,
            profile: None,
            my_posts: Vec::new(),
            compose: ComposeForm::default(),
            edit: EditForm::default(),
            status: String::new(),
            loading: false,
            tick: 0,
        }
    }

    /// Tick for animations
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Get current tick
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Viewer id, empty when anonymous
    pub fn viewer_id(&self) -> String {
        self.session
            .as_ref()
            .map(|s| s.viewer_id.clone())
            .unwrap_or_default()
    }

    /// Selected category name
    pub fn category(&self) -> &'static str {
        CATEGORIES[self.category_index % CATEGORIES.len()]
    }

    /// Recompute the visible posts after a tab, category or feed change
    pub fn apply_filter(&mut self) {
        self.visible = feed::filter(&self.posts, self.tab, Some(self.category()));
        if self.selected_post >= self.visible.len() {
            self.selected_post = self.visible.len().saturating_sub(1);
        }
    }

    /// Get the currently selected post
    pub fn selected_post(&self) -> Option<&Post> {
        self.visible.get(self.selected_post)
    }

    /// Move selection down in the feed
    pub fn select_next_post(&mut self) {
        if !self.visible.is_empty() {
            self.selected_post = (self.selected_post + 1).min(self.visible.len() - 1);
        }
    }

    /// Move selection up in the feed
    pub fn select_prev_post(&mut self) {
        self.selected_post = self.selected_post.saturating_sub(1);
    }

    /// Cycle through feed tabs
    pub fn cycle_tab(&mut self) {
        self.tab = self.tab.next();
        self.selected_post = 0;
        self.apply_filter();
    }

    /// Cycle through categories
    pub fn cycle_category(&mut self) {
        self.category_index = (self.category_index + 1) % CATEGORIES.len();
        self.selected_post = 0;
        self.apply_filter();
    }

    /// Like count to display for a post: the synchronized state once loaded,
    /// the feed's snapshot until then
    pub fn like_count(&self, post: &Post) -> u32 {
        if self.likes.knows(&post.id) {
            self.likes.state(&post.id).count
        } else {
            post.like_count
        }
    }

    /// Open the compose view with a fresh form
    pub fn open_compose(&mut self) {
        self.compose = ComposeForm::default();
        self.view = View::Compose;
    }

    /// Open the edit form prefilled from the loaded profile
    pub fn open_edit(&mut self) {
        if let Some(profile) = &self.profile {
            self.edit = EditForm::from_profile(profile);
        }
        self.view = View::EditProfile;
    }
}
