use ratatui::style::Color;
use streak_types::Theme;

use crate::app::App;

pub struct ThemeColors {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub text: Color,
    pub text_dim: Color,
    pub background: Color,
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub highlight_bg: Color,
}

/// Colors for the theme the user picked
pub fn get_theme_colors(app: &App) -> ThemeColors {
    palette(app.theme)
}

pub fn palette(theme: Theme) -> ThemeColors {
    match theme {
        Theme::Light => ThemeColors {
            primary: Color::Rgb(37, 99, 235),
            secondary: Color::Rgb(124, 58, 237),
            accent: Color::Rgb(234, 88, 12),
            text: Color::Rgb(30, 30, 30),
            text_dim: Color::Rgb(110, 110, 110),
            background: Color::Rgb(250, 250, 250),
            border: Color::Rgb(190, 190, 190),
            success: Color::Rgb(22, 163, 74),
            warning: Color::Rgb(202, 138, 4),
            error: Color::Rgb(220, 38, 38),
            highlight_bg: Color::Rgb(225, 235, 255),
        },
        Theme::Dark => ThemeColors {
            primary: Color::Rgb(96, 165, 250),
            secondary: Color::Rgb(167, 139, 250),
            accent: Color::Rgb(251, 146, 60),
            text: Color::Rgb(226, 226, 226),
            text_dim: Color::Rgb(130, 130, 140),
            background: Color::Rgb(18, 18, 24),
            border: Color::Rgb(60, 60, 72),
            success: Color::Rgb(74, 222, 128),
            warning: Color::Rgb(250, 204, 21),
            error: Color::Rgb(248, 113, 113),
            highlight_bg: Color::Rgb(38, 38, 52),
        },
    }
}
