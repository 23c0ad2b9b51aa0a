use chrono::{DateTime, NaiveDateTime};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::theme::ThemeColors;

// Layout constants
pub const BORDER_PADDING: u16 = 4; // Total horizontal padding from borders (2 per side)

/// Formats a backend timestamp as `YYYY-MM-DD HH:MM`. Unknown formats are shown as-is.
pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format("%Y-%m-%d %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, pattern) {
            return ts.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    raw.to_string()
}

/// Post body wrapped to `max_width`, with @mentions highlighted.
pub fn format_post_content_with_width(
    content: &str,
    is_selected: bool,
    theme: &ThemeColors,
    max_width: usize,
) -> Vec<Line<'static>> {
    let wrap_width = max_width.saturating_sub(4).max(1);
    let mut lines = vec![];

    for line in content.lines() {
        for wrapped_line in textwrap::wrap(line, wrap_width) {
            let mut spans = vec![Span::raw("  ")];
            for (i, word) in wrapped_line.split(' ').enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" "));
                }
                spans.push(styled_word(word, is_selected, theme));
            }
            lines.push(Line::from(spans));
        }
    }

    lines
}

fn styled_word(word: &str, is_selected: bool, theme: &ThemeColors) -> Span<'static> {
    let style = if word.starts_with('@') && word.len() > 1 {
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)
    } else if is_selected {
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };
    Span::styled(word.to_string(), style)
}

/// Text progress bar, e.g. `█████░░░░░` for 50% at width 10.
pub fn progress_bar(percent: i64, width: usize) -> String {
    let filled = (percent.clamp(0, 100) as usize * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Cuts `text` to at most `width` terminal columns, ending with an ellipsis when shortened.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Value of an optional profile field, or `-` when unknown.
pub fn or_dash(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_variants() {
        assert_eq!(format_timestamp("2024-05-01T08:30:12"), "2024-05-01 08:30");
        assert_eq!(format_timestamp("2024-05-01T08:30:12.123456"), "2024-05-01 08:30");
        assert_eq!(format_timestamp("2024-05-01T08:30:12+00:00"), "2024-05-01 08:30");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0, 4), "░░░░");
        assert_eq!(progress_bar(50, 4), "██░░");
        assert_eq!(progress_bar(100, 4), "████");
        assert_eq!(progress_bar(150, 4), "████");
    }

    #[test]
    fn test_truncate_respects_wide_chars() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
        let cut = truncate_to_width("日本語テキスト", 7);
        assert!(cut.width() <= 7);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("  ")), "-");
        assert_eq!(or_dash(Some("Ana")), "Ana");
    }
}
