use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use streak_types::Visibility;

use super::super::theme::get_theme_colors;
use super::utils::centered_rect;
use crate::app::App;

/// Render the new post composer
pub fn render_composer_modal(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);

    let modal_area = centered_rect(70, 60, area);
    frame.render_widget(Clear, modal_area);

    let outer_block = Block::default()
        .title(" New Post ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(theme.background));

    let inner = outer_block.inner(modal_area);
    frame.render_widget(outer_block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Visibility
            Constraint::Length(3), // Instructions
        ])
        .split(inner);

    let content_block = Block::default()
        .borders(Borders::ALL)
        .title("Content")
        .border_style(Style::default().fg(theme.primary));
    let content_area = content_block.inner(chunks[0]);
    frame.render_widget(content_block, chunks[0]);
    frame.render_widget(&app.composer.textarea, content_area);

    let option = |label: &'static str, active: bool| {
        if active {
            Span::styled(
                format!("[{}]", label),
                Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(theme.text_dim))
        }
    };
    let visibility = app.composer.visibility;
    let selector = Paragraph::new(Line::from(vec![
        Span::styled("Visibility: ", Style::default().fg(theme.text)),
        option("public", visibility == Visibility::Public),
        Span::raw("  "),
        option("friends", visibility == Visibility::Friends),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(selector, chunks[1]);

    let instructions = if app.composer.submitting {
        "Publishing..."
    } else {
        "Type to compose | Tab: Visibility | Ctrl+S: Publish | Esc: Cancel"
    };
    let instructions_widget = Paragraph::new(instructions)
        .style(Style::default().fg(theme.text))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(instructions_widget, chunks[2]);
}
