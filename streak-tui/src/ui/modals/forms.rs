use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::super::theme::{get_theme_colors, ThemeColors};
use super::components::{create_modal_container, render_input, render_modal_footer, ModalConfig};
use super::help::render_help_modal;
use crate::app::{App, DeleteTarget, Modal, ProfileForm, PROFILE_FIELDS};
use crate::validation::MAX_BIO_LEN;

/// Render whichever modal is open
pub fn render_modal(frame: &mut Frame, app: &App, area: Rect) {
    let Some(modal) = app.modal.as_ref() else {
        return;
    };
    let theme = get_theme_colors(app);

    match modal {
        Modal::Help => render_help_modal(frame, app, area),
        Modal::Alert { title, message } => render_alert(frame, area, title, message, &theme),
        Modal::AddHabit { name } => {
            let (rows, footer) = form_container(frame, area, " New habit ", 1, &theme);
            render_input(frame, rows[0], "Name", name, true, false, &theme);
            render_modal_footer(frame, footer, "Enter: Add | Esc: Cancel", &theme);
        }
        Modal::MarkToday { habit_name, .. } => {
            let today = chrono::Local::now().format("%Y-%m-%d").to_string();
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    habit_name.clone(),
                    Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Did you complete it today ({})?", today),
                    Style::default().fg(theme.text),
                )),
                Line::from(""),
                choice_line(&[("Y", "Done"), ("N", "Skip"), ("Esc", "Cancel")], &theme),
            ];
            render_message_box(frame, area, " Mark today ", lines, &theme);
        }
        Modal::EditProfile(form) => render_profile_form(frame, area, form, &theme),
        Modal::Visibility { is_public, bio } => {
            let (rows, footer) = form_container(frame, area, " Visibility ", 2, &theme);
            let state = if *is_public { "Public" } else { "Private" };
            let toggle = Paragraph::new(Line::from(vec![
                Span::styled("Profile: ", Style::default().fg(theme.text)),
                Span::styled(
                    state,
                    Style::default()
                        .fg(if *is_public { theme.success } else { theme.warning })
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("  (Tab to switch)", Style::default().fg(theme.text_dim)),
            ]));
            frame.render_widget(toggle, rows[0]);
            let title = format!("Bio {}/{}", bio.chars().count(), MAX_BIO_LEN);
            render_input(frame, rows[1], &title, bio, true, false, &theme);
            render_modal_footer(frame, footer, "Enter: Save | Esc: Cancel", &theme);
        }
        Modal::Comment { post_id } => {
            let input = app.feed.thread(*post_id).map(|t| t.input.as_str()).unwrap_or_default();
            let (rows, footer) = form_container(frame, area, " Comment ", 1, &theme);
            render_input(frame, rows[0], "Your comment", input, true, false, &theme);
            render_modal_footer(frame, footer, "Enter: Send | Esc: Cancel", &theme);
        }
        Modal::ConfirmDelete(target) => {
            let what = match target {
                DeleteTarget::Habit { name, .. } => format!("Delete habit \"{}\"?", name),
                DeleteTarget::Post { .. } => "Delete this post?".to_string(),
            };
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(what, Style::default().fg(theme.text))),
                Line::from(""),
                choice_line(&[("Y", "Delete"), ("N", "Keep")], &theme),
            ];
            render_message_box(frame, area, " Confirm ", lines, &theme);
        }
    }
}

/// Modal with `rows` stacked three-line rows and a footer. Returns the rows and the footer area.
fn form_container(frame: &mut Frame, area: Rect, title: &str, rows: usize, theme: &ThemeColors) -> (Vec<Rect>, Rect) {
    let config = ModalConfig {
        title,
        width_percent: 60,
        height_percent: 30 + 10 * rows as u16,
    };
    let inner = create_modal_container(frame, area, &config, theme);

    let mut constraints = vec![Constraint::Length(3); rows];
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(3));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);
    (chunks[..rows].to_vec(), chunks[rows + 1])
}

fn render_profile_form(frame: &mut Frame, area: Rect, form: &ProfileForm, theme: &ThemeColors) {
    let config = ModalConfig {
        title: " Edit profile ",
        width_percent: 60,
        height_percent: 70,
    };
    let inner = create_modal_container(frame, area, &config, theme);

    let mut constraints = vec![Constraint::Length(3); PROFILE_FIELDS.len()];
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(3));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, label) in PROFILE_FIELDS.iter().enumerate() {
        render_input(frame, rows[i], label, form.field(i), form.focus == i, false, theme);
    }
    render_modal_footer(
        frame,
        rows[PROFILE_FIELDS.len() + 1],
        "Tab: Next field | Enter: Save | Esc: Cancel",
        theme,
    );
}

fn render_alert(frame: &mut Frame, area: Rect, title: &str, message: &str, theme: &ThemeColors) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Press Enter or Esc to close", Style::default().fg(theme.text_dim))),
    ];
    render_message_box(frame, area, &format!(" {} ", title), lines, theme);
}

fn render_message_box(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>, theme: &ThemeColors) {
    let config = ModalConfig {
        title,
        width_percent: 50,
        height_percent: 30,
    };
    let inner = create_modal_container(frame, area, &config, theme);
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(body, inner);
}

fn choice_line(choices: &[(&'static str, &'static str)], theme: &ThemeColors) -> Line<'static> {
    let mut spans = vec![];
    for (key, label) in choices {
        spans.push(Span::styled(*key, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
        spans.push(Span::styled(format!(": {}  ", label), Style::default().fg(theme.text)));
    }
    Line::from(spans)
}
