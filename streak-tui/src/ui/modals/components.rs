//! Building blocks shared by modals and pages
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use streak_types::Candidate;

use super::super::theme::ThemeColors;
use super::utils::centered_rect;

/// Size and title of a modal box
pub struct ModalConfig<'a> {
    pub title: &'a str,
    pub width_percent: u16,
    pub height_percent: u16,
}

impl Default for ModalConfig<'_> {
    fn default() -> Self {
        Self {
            title: " Modal ",
            width_percent: 60,
            height_percent: 50,
        }
    }
}

/// Clears and draws the outer modal box, returning its inner area.
pub fn create_modal_container(frame: &mut Frame, area: Rect, config: &ModalConfig, theme: &ThemeColors) -> Rect {
    let modal_area = centered_rect(config.width_percent, config.height_percent, area);

    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .title(config.title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(theme.background));

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    inner
}

pub fn render_loading_state(frame: &mut Frame, area: Rect, message: &str, theme: &ThemeColors) {
    let loading = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.warning));
    frame.render_widget(loading, area);
}

pub fn render_empty_state(frame: &mut Frame, area: Rect, message: &str, theme: &ThemeColors) {
    let empty = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.text_dim));
    frame.render_widget(empty, area);
}

/// Single-line text input with a title; the cursor is drawn as a trailing block.
pub fn render_input(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    focused: bool,
    secret: bool,
    theme: &ThemeColors,
) {
    let shown = if secret {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let mut spans = vec![Span::styled(shown, Style::default().fg(theme.text))];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(theme.accent)));
    }

    let border = if focused { theme.accent } else { theme.border };
    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(input, area);
}

/// List of users with the selection highlighted when `selected` is set.
/// `note` may annotate a row, e.g. "already a friend".
pub fn render_user_list(
    frame: &mut Frame,
    area: Rect,
    users: &[Candidate],
    selected: Option<usize>,
    note: impl Fn(&Candidate) -> Option<&'static str>,
    theme: &ThemeColors,
) {
    let items: Vec<ListItem> = users
        .iter()
        .map(|user| {
            let mut spans = vec![Span::styled(
                format!("@{}", user.username),
                Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
            )];
            if !user.bio.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", user.bio),
                    Style::default().fg(theme.text_dim),
                ));
            }
            if let Some(text) = note(user) {
                spans.push(Span::styled(format!("  ({})", text), Style::default().fg(theme.success)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.highlight_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    let mut list_state = ListState::default();
    list_state.select(selected.map(|i| i.min(users.len().saturating_sub(1))));

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn render_modal_footer(frame: &mut Frame, area: Rect, shortcuts: &str, theme: &ThemeColors) {
    let footer = Paragraph::new(shortcuts)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(footer, area);
}
