use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::super::theme::get_theme_colors;
use super::utils::centered_rect;
use crate::app::App;
use crate::router::Page;

type ShortcutGroup = (&'static str, Vec<(&'static str, &'static str)>);

/// Render help modal
pub fn render_help_modal(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors(app);

    let modal_area = centered_rect(80, 85, area);
    frame.render_widget(Clear, modal_area);

    let mut lines = vec![Line::from("")];

    for (category, items) in get_shortcuts_for_context(app) {
        lines.push(Line::from(Span::styled(
            category,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));

        for (key, description) in items {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<15}", key), Style::default().fg(theme.success)),
                Span::styled(description, Style::default().fg(theme.text)),
            ]));
        }

        lines.push(Line::from(""));
    }

    let help_content = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
                .title(" Keyboard Shortcuts ")
                .title_alignment(Alignment::Center)
                .style(Style::default().bg(theme.background)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_content, modal_area);
}

/// Shortcuts relevant to the visible page
pub fn get_shortcuts_for_context(app: &App) -> Vec<ShortcutGroup> {
    let mut shortcuts = vec![(
        "Global",
        vec![
            ("q / Ctrl+C", "Quit application"),
            ("?", "Toggle this help"),
            ("t", "Toggle light/dark theme"),
        ],
    )];

    if app.current_page() == Page::Auth {
        shortcuts.push((
            "Sign in",
            vec![
                ("Tab / ↓", "Next field"),
                ("Shift+Tab / ↑", "Previous field"),
                ("F2", "Switch between sign in and sign up"),
                ("Enter", "Submit"),
                ("Esc", "Quit"),
            ],
        ));
        return shortcuts;
    }

    shortcuts.push((
        "Navigation",
        vec![
            ("Tab", "Next page"),
            ("Shift+Tab", "Previous page"),
            ("1-6", "Jump to page"),
            ("Esc", "Dismiss latest notification"),
            ("Shift+L", "Sign out"),
        ],
    ));

    let page_group = match app.current_page() {
        Page::Auth => return shortcuts,
        Page::Home => (
            "Home",
            vec![
                ("← / →", "Move between suggestions"),
                ("[ / ]", "Previous / next suggestions"),
                ("a / Enter", "Add suggested friend"),
                ("p", "View profile"),
                ("w", "Change ranking window"),
                ("r", "Refresh"),
            ],
        ),
        Page::Feed => (
            "Feed",
            vec![
                ("↑/k ↓/j", "Move between posts"),
                ("l / Space", "Like or unlike"),
                ("c / Enter", "Show or hide comments"),
                ("i", "Write a comment"),
                ("n", "New post"),
                ("m", "Load more"),
                ("p", "View author profile"),
                ("d", "Delete your post"),
                ("r", "Reload"),
            ],
        ),
        Page::Habits => (
            "Habits",
            vec![
                ("↑/k ↓/j", "Move between habits"),
                ("a", "Add habit"),
                ("Enter / m", "Mark today"),
                ("d", "Delete habit"),
                ("r", "Refresh"),
            ],
        ),
        Page::Stats => ("Stats", vec![("r", "Refresh")]),
        Page::Friends => (
            "Friends",
            vec![
                ("/ or s", "Search public profiles"),
                ("↑/k ↓/j", "Move between friends"),
                ("x / d", "Remove friend"),
                ("p / Enter", "View profile"),
                ("Enter (search)", "Add selected result"),
                ("Esc (search)", "Back to the list"),
            ],
        ),
        Page::Profile => (
            "Profile",
            vec![
                ("e", "Edit profile"),
                ("v", "Visibility and bio"),
                ("n", "New post"),
                ("d", "Delete selected post"),
                ("r", "Refresh"),
            ],
        ),
    };
    shortcuts.push(page_group);

    if app.public_profile.is_some() {
        shortcuts.push(("Public profile", vec![("↑/k ↓/j", "Scroll posts"), ("Esc / q", "Close")]));
    }

    shortcuts
}
