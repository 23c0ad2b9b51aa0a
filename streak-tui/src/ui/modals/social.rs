use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::super::formatting::{format_post_content_with_width, format_timestamp, BORDER_PADDING};
use super::super::theme::get_theme_colors;
use super::components::{create_modal_container, render_empty_state, render_loading_state, render_modal_footer, ModalConfig};
use crate::app::App;

/// Render another user's public profile on top of the current page
pub fn render_public_profile(frame: &mut Frame, app: &App, area: Rect) {
    let Some(overlay) = app.public_profile.as_ref() else {
        return;
    };
    let theme = get_theme_colors(app);

    let title = format!(" @{} ", overlay.username);
    let config = ModalConfig {
        title: &title,
        width_percent: 75,
        height_percent: 80,
    };
    let inner = create_modal_container(frame, area, &config, &theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Header
            Constraint::Min(0),    // Posts
            Constraint::Length(3), // Footer
        ])
        .split(inner);

    render_modal_footer(frame, chunks[2], "↑/↓: Scroll | Esc: Close", &theme);

    if overlay.loading {
        render_loading_state(frame, chunks[0], "Loading profile...", &theme);
        return;
    }
    if let Some(error) = &overlay.error {
        let body = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                error.clone(),
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(body, chunks[0]);
        return;
    }
    let Some(view) = &overlay.view else {
        return;
    };

    let full_name = [view.first_name.as_deref(), view.last_name.as_deref()]
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut header = vec![Line::from(vec![
        Span::styled(
            format!("@{}", view.username),
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            if view.is_public { "public" } else { "private" },
            Style::default().fg(theme.text_dim),
        ),
    ])];
    if !full_name.is_empty() {
        header.push(Line::from(Span::styled(full_name, Style::default().fg(theme.text))));
    }
    header.push(Line::from(Span::styled(
        if view.bio.is_empty() { "No bio yet".to_string() } else { view.bio.clone() },
        Style::default().fg(theme.text_dim).add_modifier(Modifier::ITALIC),
    )));
    if let Some(days) = view.done_days {
        header.push(Line::from(Span::styled(
            format!("Days done: {}", days),
            Style::default().fg(theme.success),
        )));
    }
    let header_widget = Paragraph::new(header)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(theme.border)));
    frame.render_widget(header_widget, chunks[0]);

    if overlay.posts.is_empty() {
        render_empty_state(frame, chunks[1], "No posts to show", &theme);
        return;
    }

    let width = chunks[1].width.saturating_sub(BORDER_PADDING) as usize;
    let items: Vec<ListItem> = overlay
        .posts
        .iter()
        .map(|post| {
            let mut lines = vec![Line::from(vec![
                Span::styled(format_timestamp(&post.created_at), Style::default().fg(theme.text_dim)),
                Span::raw("  "),
                Span::styled(
                    format!("♥ {}  💬 {}", post.likes, post.comments),
                    Style::default().fg(theme.text_dim),
                ),
                Span::raw("  "),
                Span::styled(post.visibility.as_str(), Style::default().fg(theme.text_dim)),
            ])];
            lines.extend(format_post_content_with_width(&post.content, false, &theme, width));
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items).highlight_style(Style::default().bg(theme.highlight_bg));
    let mut state = ListState::default();
    state.select(Some(overlay.scroll.min(overlay.posts.len() - 1)));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}
