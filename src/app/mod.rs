//! TUI Application module

mod async_ops;
mod events;
mod state;
mod ui;

pub use state::AppState;
pub use state::View;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::session;

use async_ops::{AsyncCommand, AsyncHandle, AsyncResult, spawn_worker};

/// Run the TUI application
pub fn run() -> Result<()> {
    // Create tokio runtime
    let rt = Runtime::new()?;

    // Load config
    let config = Config::load()?;

    // Establish the viewer session from the stored grant (silent refresh);
    // failure degrades to anonymous browsing
    let viewer = rt.block_on(session::establish(&config.identity));

    // Spawn async worker
    let async_handle = rt.block_on(async { spawn_worker(&config, viewer.clone()) });

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Create app state
    let mut state = AppState::new(config, viewer);

    // Trigger initial refresh
    let _ = async_handle.cmd_tx.blocking_send(AsyncCommand::RefreshFeed);
    state.loading = true;
    if state.session.is_some() {
        state.set_status("Loading feed...");
    } else {
        state.set_status("Loading feed... (signed out — run: glimpse login)");
    }

    // Main loop
    let result = run_app(&mut terminal, &mut state, async_handle);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    mut async_handle: AsyncHandle,
) -> Result<()> {
    loop {
        // Process any async results
        while let Ok(result) = async_handle.result_rx.try_recv() {
            handle_async_result(state, result);
        }

        // Draw UI
        terminal.draw(|frame| ui::render(frame, state))?;

        // Handle events
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && let Some(cmd) = events::handle_key(state, key)
        {
            let _ = async_handle.cmd_tx.blocking_send(cmd);
        }

        // Tick for animations
        state.tick();

        if state.should_quit {
            // Shutdown async worker
            let _ = async_handle.cmd_tx.blocking_send(AsyncCommand::Shutdown);
            break;
        }
    }

    // Save config on exit
    state.config.save()?;

    Ok(())
}

fn handle_async_result(state: &mut AppState, result: AsyncResult) {
    match result {
        AsyncResult::FeedLoaded { posts } => {
            state.posts = posts;
            state.selected_post = 0;
            state.apply_filter();
            state.loading = false;
            state.set_status(format!("Loaded {} posts", state.posts.len()));
        }
        AsyncResult::LikesLoaded { states } => {
            state.likes.absorb(states);
        }
        AsyncResult::PostLoaded { post } => {
            // Keep the detail view current even if the viewer navigated fast
            if state
                .detail
                .as_ref()
                .is_some_and(|current| current.id == post.id)
            {
                state.detail = Some(*post);
            }
        }
        AsyncResult::LikeCommitted { post_id, aggregate } => {
            let viewer = state.viewer_id();
            state.likes.commit(&post_id, &aggregate, &viewer);
        }
        AsyncResult::LikeFailed { post_id, message } => {
            state.likes.roll_back(&post_id);
            state.set_status(format!("❌ {message}"));
        }
        AsyncResult::PostCreated { post } => {
            state.posts.insert(0, *post);
            state.apply_filter();
            state.loading = false;
            state.view = View::Feed;
            state.set_status("✅ Post uploaded");
        }
        AsyncResult::ProfileLoaded { profile, posts } => {
            state.profile = Some(*profile);
            state.my_posts = posts;
            state.set_status("");
        }
        AsyncResult::ProfileSaved { profile } => {
            state.profile = Some(*profile);
            state.loading = false;
            state.view = View::Profile;
            state.set_status("✅ Profile updated");
        }
        AsyncResult::Error { message } => {
            state.loading = false;
            state.set_status(format!("❌ {message}"));
        }
        AsyncResult::Status { message } => {
            state.set_status(message);
        }
    }
}
