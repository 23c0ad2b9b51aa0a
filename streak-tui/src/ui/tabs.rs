use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use streak_types::Post;

use super::formatting::*;
use super::modals::*;
use super::theme::{get_theme_colors, ThemeColors};
use crate::app::{App, AuthView, FriendsFocus};
use crate::feed::CommentThread;
use crate::log_rendering;
use crate::router::Page;

pub fn render_auth_screen(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let theme = get_theme_colors(app);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let header = Paragraph::new("Streak - build habits with friends")
        .style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(header, chunks[0]);

    let state = &app.auth_state;
    let labels = state.labels();
    let form_height = (labels.len() as u16) * 3 + 2;
    let form_width = 56.min(chunks[1].width);
    let form_area = Rect::new(
        chunks[1].x + (chunks[1].width - form_width) / 2,
        chunks[1].y + chunks[1].height.saturating_sub(form_height) / 2,
        form_width,
        form_height.min(chunks[1].height),
    );

    let title = match state.view {
        AuthView::Login => " Sign in ",
        AuthView::Signup => " Create account ",
    };
    let block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); labels.len()])
        .split(inner);
    for (i, label) in labels.iter().enumerate() {
        render_input(frame, rows[i], label, state.field(i), state.focus == i, state.is_secret(i), &theme);
    }

    let hint = if state.submitting {
        "Please wait..."
    } else {
        match state.view {
            AuthView::Login => "Tab: Next field | Enter: Sign in | F2: Create account | Esc: Quit",
            AuthView::Signup => "Tab: Next field | Enter: Sign up | F2: Back to sign in | Esc: Quit",
        }
    };
    let footer = Paragraph::new(hint)
        .style(Style::default().fg(theme.text_dim))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(footer, chunks[2]);
}

pub fn render_main_screen(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Page-specific actions
            Constraint::Length(3), // Global footer
        ])
        .split(area);

    render_tab_header(frame, app, chunks[0]);

    log_rendering!(app.log_config, "Rendering page {:?}", app.current_page());
    match app.current_page() {
        Page::Auth => {}
        Page::Home => render_home_page(frame, app, chunks[1]),
        Page::Feed => render_feed_page(frame, app, chunks[1]),
        Page::Habits => render_habits_page(frame, app, chunks[1]),
        Page::Stats => render_stats_page(frame, app, chunks[1]),
        Page::Friends => render_friends_page(frame, app, chunks[1]),
        Page::Profile => render_profile_page(frame, app, chunks[1]),
    }

    render_page_actions(frame, app, chunks[2]);
    render_global_footer(frame, app, chunks[3]);
}

pub fn render_tab_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);
    let current = app.current_page();

    let mut tab_spans = vec![];
    for (i, page) in Page::TABS.iter().enumerate() {
        let style = if *page == current {
            Style::default()
                .fg(theme.success)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.text_dim)
        };
        tab_spans.push(Span::styled(format!(" {} {} ", i + 1, page.title()), style));
        if i < Page::TABS.len() - 1 {
            tab_spans.push(Span::styled(" | ", Style::default().fg(theme.border)));
        }
    }

    let user = app.user.as_ref().map(|u| format!(" @{} ", u.username)).unwrap_or_default();
    let header = Paragraph::new(Line::from(tab_spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(Span::styled(user, Style::default().fg(theme.primary))),
        );
    frame.render_widget(header, area);
}

/// Context-appropriate action text for the visible page
pub fn get_action_bar_text(app: &App) -> &'static str {
    match app.current_page() {
        Page::Auth => "",
        Page::Home => "←/→: Select | [/]: Page | a: Add friend | p: Profile | w: Ranking window",
        Page::Feed => "l: Like | c: Comments | i: Comment | n: Post | m: More | p: Profile",
        Page::Habits => "a: Add | Enter: Mark today | d: Delete",
        Page::Stats => "r: Refresh",
        Page::Friends => match app.friends_state.focus {
            FriendsFocus::List => "/: Search | x: Remove | p: Profile",
            FriendsFocus::Search => "Type to search | ↑/↓: Select | Enter: Add | Esc: Back",
        },
        Page::Profile => "e: Edit profile | v: Visibility | n: Post | d: Delete post",
    }
}

pub fn render_page_actions(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);

    frame.render_widget(Clear, area);
    let widget = Paragraph::new(get_action_bar_text(app))
        .style(Style::default().fg(theme.text).bg(theme.background))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

pub fn render_global_footer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);

    frame.render_widget(Clear, area);
    let footer = Paragraph::new("Tab/1-6: Pages | t: Theme | Shift+L: Sign out | ?: Help | q: Quit")
        .style(Style::default().fg(theme.text_dim).bg(theme.background))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(footer, area);
}

fn section_block<'a>(title: String, theme: &ThemeColors) -> Block<'a> {
    Block::default()
        .title(Span::styled(title, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
}

fn create_loading_display(message: &str, theme: &ThemeColors) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("⟳ {}", message),
            Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
        )),
    ]
}

// ---- Home ----

pub fn render_home_page(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(area);

    render_recommendations(frame, app, chunks[0]);
    render_ranking(frame, app, chunks[1]);
}

fn render_recommendations(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);
    let carousel = &app.home_state.carousel;

    let mut title = " Suggested friends ".to_string();
    if carousel.has_paging() {
        let shown = carousel.offset() + carousel.visible().len();
        title = format!(" Suggested friends ◀ {}/{} ▶ ", shown, carousel.items().len());
    }
    let block = section_block(title, &theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.home_state.loading && carousel.items().is_empty() {
        frame.render_widget(Paragraph::new(create_loading_display("Loading suggestions...", &theme)), inner);
        return;
    }
    if carousel.items().is_empty() {
        render_empty_state(frame, inner, "No suggestions right now", &theme);
        return;
    }

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(inner);
    for (i, candidate) in carousel.visible().iter().enumerate() {
        let selected = i == carousel.cursor;
        let border = if selected { theme.accent } else { theme.border };
        let width = cards[i].width.saturating_sub(2) as usize;
        let lines = vec![
            Line::from(Span::styled(
                truncate_to_width(&format!("@{}", candidate.username), width),
                Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                truncate_to_width(&candidate.bio, width),
                Style::default().fg(theme.text_dim),
            )),
        ];
        let card = Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
        frame.render_widget(card, cards[i]);
    }
}

fn render_ranking(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);
    let ranking = &app.home_state.ranking;

    let block = section_block(format!(" Top streaks · last {} ", ranking.window.label()), &theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if ranking.loading && ranking.entries.is_empty() {
        frame.render_widget(Paragraph::new(create_loading_display("Loading ranking...", &theme)), inner);
        return;
    }
    if ranking.entries.is_empty() {
        render_empty_state(frame, inner, "Nobody on the board yet", &theme);
        return;
    }

    let items: Vec<ListItem> = ranking
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let name = if entry.username.is_empty() {
                entry.user_id.map(|id| format!("user #{}", id)).unwrap_or_default()
            } else {
                format!("@{}", entry.username)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(theme.text_dim)),
                Span::styled(format!("{:<24}", name), Style::default().fg(theme.text)),
                Span::styled(
                    format!("{} days", entry.done_days),
                    Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
                ),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items), inner);
}

// ---- Feed ----

pub fn render_feed_page(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);
    let feed = &app.feed;

    let block = section_block(" Feed ".to_string(), &theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if feed.posts().is_empty() {
        if app.flight.is_active("feed") {
            frame.render_widget(Paragraph::new(create_loading_display("Loading feed...", &theme)), inner);
        } else {
            render_empty_state(frame, inner, "No posts yet. Press n to write one.", &theme);
        }
        return;
    }

    let width = inner.width.saturating_sub(BORDER_PADDING) as usize;
    let mut items: Vec<ListItem> = feed
        .posts()
        .iter()
        .enumerate()
        .map(|(i, post)| post_item(post, i == feed.selected, feed.thread(post.id), &theme, width))
        .collect();

    let trailer = if app.flight.is_active("feed") {
        "Loading more..."
    } else if feed.has_more() {
        "Press m for more"
    } else {
        "You're all caught up"
    };
    items.push(ListItem::new(Line::from(Span::styled(
        trailer,
        Style::default().fg(theme.text_dim).add_modifier(Modifier::ITALIC),
    ))));

    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.highlight_bg))
        .highlight_symbol("▌");
    let mut state = ListState::default();
    state.select(Some(feed.selected));
    frame.render_stateful_widget(list, inner, &mut state);
}

fn post_item(
    post: &Post,
    selected: bool,
    thread: Option<&CommentThread>,
    theme: &ThemeColors,
    width: usize,
) -> ListItem<'static> {
    let heart = if post.is_liked() { "♥" } else { "♡" };
    let like_color = if post.is_liked() { theme.error } else { theme.text_dim };
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("@{}", post.username),
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", format_timestamp(&post.created_at)),
            Style::default().fg(theme.text_dim),
        ),
    ])];
    lines.extend(format_post_content_with_width(&post.content, selected, theme, width));
    lines.push(Line::from(vec![
        Span::styled(format!("  {} {}", heart, post.likes), Style::default().fg(like_color)),
        Span::styled(format!("   💬 {}", post.comments), Style::default().fg(theme.text_dim)),
    ]));

    if let Some(thread) = thread {
        if thread.loading && thread.comments.is_empty() {
            lines.push(Line::from(Span::styled("    Loading comments...", Style::default().fg(theme.warning))));
        } else if thread.comments.is_empty() {
            lines.push(Line::from(Span::styled("    No comments yet", Style::default().fg(theme.text_dim))));
        }
        for comment in &thread.comments {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("    @{}: ", comment.username),
                    Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD),
                ),
                Span::styled(comment.content.clone(), Style::default().fg(theme.text)),
            ]));
        }
    }

    lines.push(Line::from(""));
    ListItem::new(lines)
}

// ---- Habits ----

pub fn render_habits_page(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);
    let state = &app.habits_state;

    let block = section_block(" My habits ".to_string(), &theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.habits.is_empty() {
        if state.loading {
            frame.render_widget(Paragraph::new(create_loading_display("Loading habits...", &theme)), inner);
        } else {
            render_empty_state(frame, inner, "No habits yet. Press a to add one.", &theme);
        }
        return;
    }

    let items: Vec<ListItem> = state
        .habits
        .iter()
        .map(|habit| ListItem::new(Span::styled(habit.name.clone(), Style::default().fg(theme.text))))
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.highlight_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));
    frame.render_stateful_widget(list, inner, &mut list_state);
}

// ---- Stats ----

pub fn render_stats_page(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);
    let state = &app.stats_state;

    let block = section_block(" Weekly stats ".to_string(), &theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(stats) = state.stats.as_ref() else {
        if state.loading {
            frame.render_widget(Paragraph::new(create_loading_display("Loading stats...", &theme)), inner);
        } else {
            render_empty_state(frame, inner, "No data", &theme);
        }
        return;
    };
    if stats.items.is_empty() {
        render_empty_state(frame, inner, "No data", &theme);
        return;
    }

    let bar_width = (inner.width as usize).saturating_sub(12).clamp(10, 40);
    let mut lines = vec![];
    for item in &stats.items {
        let pct = item.percent();
        let (today_text, today_color) = if item.today_done {
            ("done", theme.success)
        } else {
            ("-", theme.text_dim)
        };
        lines.push(Line::from(Span::styled(
            item.habit_name.clone(),
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  Last 7 days: {}/{} ({}%)", item.done, item.total_days, pct),
            Style::default().fg(theme.text),
        )));
        lines.push(Line::from(vec![
            Span::styled(format!("  {}", progress_bar(pct, bar_width)), Style::default().fg(theme.success)),
            Span::styled(format!(" {:>3}%", pct), Style::default().fg(theme.text_dim)),
        ]));
        lines.push(Line::from(vec![
            Span::styled(format!("  Today: {} ", stats.today), Style::default().fg(theme.text_dim)),
            Span::styled(today_text, Style::default().fg(today_color)),
        ]));
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

// ---- Friends ----

pub fn render_friends_page(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);
    let state = &app.friends_state;

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    // Friends list
    let block = section_block(format!(" Friends ({}) ", state.friends.len()), &theme);
    let inner = block.inner(columns[0]);
    frame.render_widget(block, columns[0]);
    if state.friends.is_empty() {
        if state.loading {
            frame.render_widget(Paragraph::new(create_loading_display("Loading friends...", &theme)), inner);
        } else {
            render_empty_state(frame, inner, "No friends yet", &theme);
        }
    } else {
        let selected = (state.focus == FriendsFocus::List).then_some(state.selected);
        render_user_list(frame, inner, &state.friends, selected, |_| None, &theme);
    }

    // Search
    let block = section_block(" Find people ".to_string(), &theme);
    let inner = block.inner(columns[1]);
    frame.render_widget(block, columns[1]);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    let searching = state.focus == FriendsFocus::Search;
    render_input(frame, rows[0], "Search", &state.query, searching, false, &theme);

    if state.query.trim().is_empty() {
        render_empty_state(frame, rows[1], "Start typing to search public profiles", &theme);
    } else if state.searching {
        render_loading_state(frame, rows[1], "Searching...", &theme);
    } else if state.results.is_empty() {
        render_empty_state(frame, rows[1], "No public profiles match", &theme);
    } else {
        let selected = searching.then_some(state.result_selected);
        render_user_list(
            frame,
            rows[1],
            &state.results,
            selected,
            |c| state.is_friend(c.id).then_some("already a friend"),
            &theme,
        );
    }
}

// ---- Profile ----

pub fn render_profile_page(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(0)])
        .split(area);

    let profile = app.profile.clone().unwrap_or_default();
    let now = Instant::now();
    let mut title = " My profile ".to_string();
    if app.changes_saved_visible(now) {
        title = " My profile · Changes saved. ".to_string();
    } else if app.saved_hint_visible(now) {
        title = " My profile · Saved ".to_string();
    }

    let label = |name: &str| Span::styled(format!("{:<12}", name), Style::default().fg(theme.text_dim));
    let value = |text: String| Span::styled(text, Style::default().fg(theme.text));
    let (username, email) = app
        .user
        .as_ref()
        .map(|u| (u.username.clone(), u.email.clone()))
        .unwrap_or_default();

    let lines = vec![
        Line::from(vec![label("Username"), value(format!("@{}", username))]),
        Line::from(vec![label("Email"), value(or_dash(Some(email.as_str())))]),
        Line::from(vec![label("First name"), value(or_dash(profile.first_name.as_deref()))]),
        Line::from(vec![label("Last name"), value(or_dash(profile.last_name.as_deref()))]),
        Line::from(vec![label("Gender"), value(or_dash(profile.gender.as_deref()))]),
        Line::from(vec![label("Birth date"), value(or_dash(profile.birth_date.as_deref()))]),
        Line::from(vec![label("Age"), value(app.age().map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()))]),
        Line::from(vec![
            label("Visibility"),
            value(if profile.is_public() { "Public" } else { "Private" }.to_string()),
        ]),
        Line::from(vec![label("Bio"), value(or_dash(profile.bio.as_deref()))]),
    ];
    let info = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(section_block(title, &theme));
    frame.render_widget(info, chunks[0]);

    let state = &app.profile_state;
    let block = section_block(format!(" My posts ({}) ", state.posts.len()), &theme);
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    if state.posts.is_empty() {
        if state.loading {
            frame.render_widget(Paragraph::new(create_loading_display("Loading posts...", &theme)), inner);
        } else {
            render_empty_state(frame, inner, "You have not posted yet", &theme);
        }
        return;
    }

    let width = inner.width.saturating_sub(BORDER_PADDING) as usize;
    let items: Vec<ListItem> = state
        .posts
        .iter()
        .enumerate()
        .map(|(i, post)| post_item(post, i == state.selected, None, &theme, width))
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.highlight_bg))
        .highlight_symbol("▌");
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));
    frame.render_stateful_widget(list, inner, &mut list_state);
}
