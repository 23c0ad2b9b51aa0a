// UI module - split into cohesive submodules
pub mod theme;
mod formatting;
mod modals;
mod tabs;

pub use self::render_main::render;

mod render_main {
    use ratatui::{
        layout::Alignment,
        style::{Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Clear, Paragraph},
        Frame,
    };

    use super::modals::{render_composer_modal, render_modal, render_public_profile, render_toasts};
    use super::tabs::{render_auth_screen, render_main_screen};
    use super::theme::get_theme_colors;
    use crate::app::App;
    use crate::router::Page;

    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 20;

    /// Render the UI. Overlays are drawn over the page in a fixed order and
    /// toasts always come last.
    pub fn render(app: &App, frame: &mut Frame) {
        let area = frame.area();
        let theme = get_theme_colors(app);

        frame.render_widget(Clear, area);
        let background = Block::default().style(Style::default().bg(theme.background));
        frame.render_widget(background, area);

        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            let warning = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Terminal Too Small",
                    Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Minimum size: {}x{}", MIN_WIDTH, MIN_HEIGHT),
                    Style::default().fg(theme.text),
                )),
                Line::from(Span::styled(
                    format!("Current size: {}x{}", area.width, area.height),
                    Style::default().fg(theme.warning),
                )),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.error)),
            );
            frame.render_widget(warning, area);
            return;
        }

        if app.current_page() == Page::Auth {
            render_auth_screen(frame, app);
        } else {
            render_main_screen(frame, app);
            render_public_profile(frame, app, area);
            if app.composer.open {
                render_composer_modal(frame, app, area);
            }
        }

        render_modal(frame, app, area);
        render_toasts(frame, app, area);
    }
}
