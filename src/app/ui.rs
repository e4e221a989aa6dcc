//! UI rendering for the TUI

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
};

use unicode_width::UnicodeWidthStr;

use super::state::{AppState, ComposeField, EditField, View};
use crate::feed::FeedTab;
use crate::models::Post;
use crate::qr::ShareCard;

/// glimpse icon
const ICON: &str = "🔭";

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;
const LIKED: Color = Color::Red;

fn accent() -> Style {
    Style::default().fg(ACCENT)
}

fn muted() -> Style {
    Style::default().fg(MUTED)
}

fn block(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused { accent() } else { muted() })
}

/// Main render function
pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Length(1), // Categories
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_tabs(frame, state, chunks[0]);
    render_categories(frame, state, chunks[1]);
    render_main(frame, state, chunks[2]);
    render_status_bar(frame, state, chunks[3]);

    if state.view == View::Help {
        render_help_popup(frame);
    }
}

fn render_tabs(frame: &mut Frame, state: &AppState, area: Rect) {
    let titles: Vec<Line> = FeedTab::all()
        .iter()
        .map(|tab| {
            Line::from(format!(
                "{}  {}",
                if *tab == state.tab { "●" } else { "○" },
                tab.name()
            ))
        })
        .collect();

    let selected = FeedTab::all()
        .iter()
        .position(|t| *t == state.tab)
        .unwrap_or(0);

    let signed_in = state.session.is_some();
    let title = if signed_in {
        format!(" {ICON} glimpse ")
    } else {
        format!(" {ICON} glimpse (signed out) ")
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(muted())
                .title(title)
                .title_style(accent().add_modifier(Modifier::BOLD)),
        )
        .select(selected)
        .style(muted())
        .highlight_style(accent().add_modifier(Modifier::BOLD))
        .divider(Span::styled(" │ ", muted()));

    frame.render_widget(tabs, area);
}

fn render_categories(frame: &mut Frame, state: &AppState, area: Rect) {
    let spans: Vec<Span> = crate::feed::CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let style = if i == state.category_index % crate::feed::CATEGORIES.len() {
                accent().add_modifier(Modifier::UNDERLINED)
            } else {
                muted()
            };
            Span::styled(format!(" {category} "), style)
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_main(frame: &mut Frame, state: &AppState, area: Rect) {
    match state.view {
        View::Feed | View::Help => render_feed(frame, state, area),
        View::Detail => render_detail(frame, state, area),
        View::Compose => render_compose(frame, state, area),
        View::Profile => render_profile(frame, state, area),
        View::EditProfile => render_edit(frame, state, area),
        View::Share => render_share(frame, state, area),
    }
}

fn like_line(state: &AppState, post: &Post) -> Vec<Span<'static>> {
    let likes = state.likes.state(&post.id);
    let pending = state.likes.is_pending(&post.id);

    let (heart, style) = if pending {
        ("…", muted())
    } else if likes.liked {
        ("♥", Style::default().fg(LIKED))
    } else {
        ("♡", muted())
    };

    vec![
        Span::styled(format!("{heart} "), style),
        Span::styled(state.like_count(post).to_string(), muted()),
        Span::styled(format!("  💬 {}", post.comment_count), muted()),
    ]
}

fn render_feed(frame: &mut Frame, state: &AppState, area: Rect) {
    let title = format!("📰 {} · {}", state.tab.name(), state.category());

    let items: Vec<ListItem> = if state.loading && state.visible.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "  ⏳ Loading...",
            muted(),
        )))]
    } else if state.visible.is_empty() {
        vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled("  No posts here yet", muted()))),
            ListItem::new(Line::from(vec![
                Span::styled("  Press ", muted()),
                Span::styled("[r]", accent()),
                Span::styled(" to refresh", muted()),
            ])),
        ]
    } else {
        state
            .visible
            .iter()
            .enumerate()
            .map(|(i, post)| {
                let selected = i == state.selected_post;

                let mut header = vec![
                    Span::styled(
                        format!(" {} ", post.title),
                        if selected {
                            accent().add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().add_modifier(Modifier::BOLD)
                        },
                    ),
                    Span::styled(format!("[{}]", post.category), muted()),
                ];
                if post.is_followed {
                    header.push(Span::styled(" ✓ following", muted()));
                }
                // Pad the header to full width for the selection highlight
                if selected {
                    let width = area.width.saturating_sub(2) as usize;
                    let used: usize = header
                        .iter()
                        .map(|s| UnicodeWidthStr::width(s.content.as_ref()))
                        .sum();
                    if used < width {
                        header.push(Span::styled(" ".repeat(width - used), accent()));
                    }
                }

                let mut meta = vec![Span::styled(
                    format!("   @{} · {} · ", post.author_name, post.relative_time()),
                    muted(),
                )];
                meta.extend(like_line(state, post));

                ListItem::new(vec![Line::from(header), Line::from(meta)])
            })
            .collect()
    };

    let list = List::new(items).block(block(&title, true));
    frame.render_widget(list, area);
}

fn render_detail(frame: &mut Frame, state: &AppState, area: Rect) {
    let Some(post) = &state.detail else {
        frame.render_widget(block("Post", true), area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            post.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "@{} · {} · [{}]",
                post.author_name,
                post.created_at.format("%Y-%m-%d %H:%M"),
                post.category
            ),
            muted(),
        )),
        Line::from(""),
    ];

    let width = area.width.saturating_sub(4).max(20) as usize;
    for wrapped in textwrap::wrap(&post.body, width) {
        lines.push(Line::from(wrapped.into_owned()));
    }

    lines.push(Line::from(""));
    if let Some(media) = &post.media_url {
        lines.push(Line::from(vec![
            Span::styled("media: ", muted()),
            Span::styled(media.clone(), accent()),
        ]));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(like_line(state, post)));

    let paragraph = Paragraph::new(lines)
        .block(block("📄 Post", true))
        .wrap(Wrap { trim: false })
        .scroll((state.detail_scroll as u16, 0));

    frame.render_widget(paragraph, area);
}

fn form_field<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let marker = if focused { "▸" } else { " " };
    Line::from(vec![
        Span::styled(
            format!(" {marker} {label:<10}"),
            if focused { accent() } else { muted() },
        ),
        Span::raw(value),
        Span::styled(if focused { "▏" } else { "" }, accent()),
    ])
}

fn render_compose(frame: &mut Frame, state: &AppState, area: Rect) {
    let form = &state.compose;

    let lines = vec![
        Line::from(""),
        form_field("Title", &form.title, form.field == ComposeField::Title),
        Line::from(""),
        form_field(
            "Category",
            form.category(),
            form.field == ComposeField::Category,
        ),
        Line::from(""),
        form_field("Story", &form.bio, form.field == ComposeField::Bio),
        Line::from(""),
        form_field("Media", &form.media_path, form.field == ComposeField::Media),
        Line::from(""),
        Line::from(Span::styled(
            "  Tab next field · Space cycle category · Enter upload · Esc cancel",
            muted(),
        )),
    ];

    let paragraph = Paragraph::new(lines).block(block("📤 Upload post", true));
    frame.render_widget(paragraph, area);
}

fn render_profile(frame: &mut Frame, state: &AppState, area: Rect) {
    let mut lines = vec![Line::from("")];

    if let Some(profile) = &state.profile {
        let name = if profile.name.is_empty() {
            "Your Name"
        } else {
            profile.name.as_str()
        };
        lines.push(Line::from(Span::styled(
            format!("  {name}"),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  ID: {}", profile.id),
            muted(),
        )));
        lines.push(Line::from(""));
        let bio = if profile.bio.is_empty() {
            "You have no bio yet"
        } else {
            profile.bio.as_str()
        };
        lines.push(Line::from(format!("  {bio}")));
        if let Some(avatar) = &profile.avatar_url {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  avatar: ", muted()),
                Span::styled(avatar.clone(), accent()),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} posts", state.my_posts.len()),
            muted(),
        )));
        lines.push(Line::from(""));
        for post in state.my_posts.iter().take(10) {
            lines.push(Line::from(vec![
                Span::raw(format!("  • {} ", post.title)),
                Span::styled(
                    format!("[{}] · {}", post.category, post.relative_time()),
                    muted(),
                ),
            ]));
        }
    } else {
        lines.push(Line::from(Span::styled("  ⏳ Loading profile...", muted())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  e edit · s share QR · r reload · Esc back",
        muted(),
    )));

    let paragraph = Paragraph::new(lines).block(block("👤 Profile", true));
    frame.render_widget(paragraph, area);
}

fn render_edit(frame: &mut Frame, state: &AppState, area: Rect) {
    let form = &state.edit;

    let lines = vec![
        Line::from(""),
        form_field("Name", &form.name, form.field == EditField::Name),
        Line::from(""),
        form_field("Bio", &form.bio, form.field == EditField::Bio),
        Line::from(""),
        form_field("Avatar", &form.avatar, form.field == EditField::Avatar),
        Line::from(""),
        Line::from(Span::styled(
            "  Tab next field · Enter save · Esc cancel",
            muted(),
        )),
    ];

    let paragraph = Paragraph::new(lines).block(block("✏️ Edit profile", true));
    frame.render_widget(paragraph, area);
}

fn render_share(frame: &mut Frame, state: &AppState, area: Rect) {
    let mut lines = vec![Line::from("")];

    if let Some(profile) = &state.profile {
        let card = ShareCard::new(&profile.id, &profile.name, &state.config.backend_url);
        lines.push(Line::from(Span::styled(
            format!("  {}", profile.name),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  ID: {}", profile.id),
            muted(),
        )));
        lines.push(Line::from(""));
        match card.payload() {
            Ok(payload) => {
                let width = area.width.saturating_sub(6).max(20) as usize;
                for wrapped in textwrap::wrap(&payload, width) {
                    lines.push(Line::from(Span::styled(
                        format!("  {wrapped}"),
                        accent(),
                    )));
                }
            }
            Err(e) => lines.push(Line::from(Span::styled(format!("  {e}"), muted()))),
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Encode this payload as a QR code to share your profile",
            muted(),
        )));
    } else {
        lines.push(Line::from(Span::styled("  No profile loaded", muted())));
    }

    let paragraph = Paragraph::new(lines).block(block("📇 Share profile", true));
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let spinner = if state.loading {
        const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
        FRAMES[(state.current_tick() / 2) as usize % FRAMES.len()]
    } else {
        " "
    };

    let line = Line::from(vec![
        Span::styled(format!(" {spinner} "), accent()),
        Span::raw(state.status.clone()),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_help_popup(frame: &mut Frame) {
    let area = centered_rect(52, 18, frame.area());
    frame.render_widget(Clear, area);

    let rows = [
        ("j/k", "move selection"),
        ("Tab", "cycle feed tab"),
        ("c", "cycle category"),
        ("Enter", "open post"),
        ("l", "like / unlike"),
        ("o", "open media in browser"),
        ("r", "refresh"),
        ("n", "upload a post"),
        ("p", "profile"),
        ("e / s", "edit / share profile"),
        ("q", "quit"),
    ];

    let mut lines = vec![Line::from("")];
    for (key, action) in rows {
        lines.push(Line::from(vec![
            Span::styled(format!("  {key:<8}"), accent()),
            Span::raw(action),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .block(block("❔ Help", true));
    frame.render_widget(paragraph, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
