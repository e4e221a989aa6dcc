//! Event handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::async_ops::AsyncCommand;
use super::state::{AppState, View};
use crate::models::ProfileUpdate;

/// Handle key events, returning an optional async command
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    // Form views swallow all input
    match state.view {
        View::Compose => return handle_compose_key(state, key),
        View::EditProfile => return handle_edit_key(state, key),
        View::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                state.view = View::Feed;
            }
            return None;
        }
        View::Share => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                state.view = View::Profile;
            }
            return None;
        }
        _ => {}
    }

    // Global shortcuts
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            return None;
        }
        (_, KeyCode::Char('?')) | (_, KeyCode::F(1)) => {
            state.view = View::Help;
            return None;
        }
        _ => {}
    }

    match state.view {
        View::Feed => handle_feed_key(state, key),
        View::Detail => handle_detail_key(state, key),
        View::Profile => handle_profile_key(state, key),
        _ => None,
    }
}

fn handle_feed_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.select_next_post();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.select_prev_post();
            None
        }
        KeyCode::Char('g') => {
            state.selected_post = 0;
            None
        }
        KeyCode::Char('G') => {
            if !state.visible.is_empty() {
                state.selected_post = state.visible.len() - 1;
            }
            None
        }
        KeyCode::Tab => {
            state.cycle_tab();
            None
        }
        KeyCode::Char('c') => {
            state.cycle_category();
            None
        }
        KeyCode::Char('r') => {
            state.loading = true;
            state.set_status("Loading feed...");
            Some(AsyncCommand::RefreshFeed)
        }
        KeyCode::Char('l') => begin_like(state),
        KeyCode::Char('o') => {
            if let Some(url) = state.selected_post().and_then(|p| p.media_url.clone()) {
                let _ = open::that(url);
            }
            None
        }
        KeyCode::Enter => {
            let post = state.selected_post().cloned()?;
            let post_id = post.id.clone();
            state.detail = Some(post);
            state.detail_scroll = 0;
            state.view = View::Detail;
            // Refetch so counts and body are current
            Some(AsyncCommand::FetchPost { post_id })
        }
        KeyCode::Char('n') => {
            if state.session.is_some() {
                state.open_compose();
            } else {
                state.set_status("Sign in to upload posts (run: glimpse login)");
            }
            None
        }
        KeyCode::Char('p') => open_profile(state),
        _ => None,
    }
}

fn handle_detail_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => {
            state.view = View::Feed;
            state.detail = None;
            None
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.detail_scroll = state.detail_scroll.saturating_add(1);
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.detail_scroll = state.detail_scroll.saturating_sub(1);
            None
        }
        KeyCode::Char('l') => {
            let post_id = state.detail.as_ref()?.id.clone();
            begin_like_for(state, &post_id)
        }
        KeyCode::Char('o') => {
            if let Some(url) = state.detail.as_ref().and_then(|p| p.media_url.clone()) {
                let _ = open::that(url);
            }
            None
        }
        _ => None,
    }
}

fn handle_profile_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => {
            state.view = View::Feed;
            None
        }
        KeyCode::Char('e') => {
            state.open_edit();
            None
        }
        KeyCode::Char('s') => {
            state.view = View::Share;
            None
        }
        KeyCode::Char('r') => {
            state.set_status("Loading profile...");
            Some(AsyncCommand::LoadProfile)
        }
        _ => None,
    }
}

fn handle_compose_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Esc => {
            state.view = View::Feed;
            None
        }
        KeyCode::Tab => {
            state.compose.field = state.compose.field.next();
            None
        }
        KeyCode::Enter => match state.compose.validate() {
            Ok(draft) => {
                state.loading = true;
                state.set_status("Uploading...");
                Some(AsyncCommand::CreatePost { draft })
            }
            Err(notice) => {
                state.set_status(notice);
                None
            }
        },
        KeyCode::Char(c) => {
            if let Some(text) = state.compose.active_text() {
                text.push(c);
            } else if c == ' ' {
                // Category is a picker, not a text field
                state.compose.next_category();
            }
            None
        }
        KeyCode::Backspace => {
            if let Some(text) = state.compose.active_text() {
                text.pop();
            }
            None
        }
        _ => None,
    }
}

fn handle_edit_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Esc => {
            state.view = View::Profile;
            None
        }
        KeyCode::Tab => {
            state.edit.field = state.edit.field.next();
            None
        }
        KeyCode::Enter => {
            if let Err(notice) = state.edit.validate() {
                state.set_status(notice);
                return None;
            }
            let update = ProfileUpdate {
                subject: state.viewer_id(),
                name: state.edit.name.trim().to_string(),
                bio: state.edit.bio.trim().to_string(),
                avatar_url: {
                    let avatar = state.edit.avatar.trim();
                    (!avatar.is_empty()).then(|| avatar.to_string())
                },
            };
            state.loading = true;
            state.set_status("Saving profile...");
            Some(AsyncCommand::SaveProfile { update })
        }
        KeyCode::Char(c) => {
            if let Some(text) = state.edit.active_text() {
                text.push(c);
            }
            None
        }
        KeyCode::Backspace => {
            if let Some(text) = state.edit.active_text() {
                text.pop();
            }
            None
        }
        _ => None,
    }
}

fn open_profile(state: &mut AppState) -> Option<AsyncCommand> {
    if state.session.is_none() {
        state.set_status("Sign in to view your profile (run: glimpse login)");
        return None;
    }
    state.view = View::Profile;
    state.set_status("Loading profile...");
    Some(AsyncCommand::LoadProfile)
}

fn begin_like(state: &mut AppState) -> Option<AsyncCommand> {
    let post_id = state.selected_post()?.id.clone();
    begin_like_for(state, &post_id)
}

/// Start the optimistic toggle and hand the wire operation to the worker.
/// While the toggle is pending the control is disabled, so a double press
/// cannot drift the count.
fn begin_like_for(state: &mut AppState, post_id: &str) -> Option<AsyncCommand> {
    if state.likes.is_pending(post_id) {
        return None;
    }

    let viewer = state.viewer_id();
    match state.likes.begin_toggle(post_id, &viewer) {
        Ok(op) => Some(AsyncCommand::PushLike {
            post_id: post_id.to_string(),
            op,
        }),
        Err(e) => {
            state.set_status(e.to_string());
            None
        }
    }
}
