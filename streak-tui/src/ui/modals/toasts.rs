use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::super::formatting::truncate_to_width;
use super::super::theme::get_theme_colors;
use crate::app::App;
use crate::toast::ToastKind;

const TOAST_WIDTH: u16 = 42;
const TOAST_HEIGHT: u16 = 4;

/// Stack toasts in the top-right corner, newest at the bottom. Toasts that no
/// longer fit are skipped, oldest first.
pub fn render_toasts(frame: &mut Frame, app: &App, area: Rect) {
    if app.toasts.is_empty() || area.width < TOAST_WIDTH + 2 {
        return;
    }
    let theme = get_theme_colors(app);
    let fits = (area.height.saturating_sub(1) / TOAST_HEIGHT) as usize;
    let skip = app.toasts.len().saturating_sub(fits);

    let x = area.x + area.width - TOAST_WIDTH - 1;
    for (row, toast) in app.toasts.iter().skip(skip).enumerate() {
        let rect = Rect::new(x, area.y + 1 + row as u16 * TOAST_HEIGHT, TOAST_WIDTH, TOAST_HEIGHT);

        let (color, default_title) = match toast.kind {
            ToastKind::Success => (theme.success, "Done"),
            ToastKind::Error => (theme.error, "Error"),
            ToastKind::Info => (theme.primary, "Info"),
        };
        let title = toast.title.as_deref().unwrap_or(default_title);
        let mut border = Style::default().fg(color);
        if toast.is_leaving() {
            border = border.add_modifier(Modifier::DIM);
        } else {
            border = border.add_modifier(Modifier::BOLD);
        }

        let body = Paragraph::new(Line::from(Span::styled(
            truncate_to_width(&toast.message, (TOAST_WIDTH as usize - 2) * 2),
            Style::default().fg(theme.text),
        )))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_style(border)
                .style(Style::default().bg(theme.background)),
        );

        frame.render_widget(Clear, rect);
        frame.render_widget(body, rect);
    }
}
