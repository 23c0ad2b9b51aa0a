use serde::{Deserialize, Serialize};

/// Who can see a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Friends,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Friends => "friends",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "public" => Some(Visibility::Public),
            "friends" => Some(Visibility::Friends),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Visibility::Public => Visibility::Friends,
            Visibility::Friends => Visibility::Public,
        }
    }
}

/// UI theme preference, persisted as `light` or `dark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Time window (in days) used by the public ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankWindow {
    #[default]
    Week,
    Month,
    Quarter,
}

impl RankWindow {
    pub fn days(&self) -> u32 {
        match self {
            RankWindow::Week => 7,
            RankWindow::Month => 30,
            RankWindow::Quarter => 90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankWindow::Week => "7 days",
            RankWindow::Month => "30 days",
            RankWindow::Quarter => "90 days",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            RankWindow::Week => RankWindow::Month,
            RankWindow::Month => RankWindow::Quarter,
            RankWindow::Quarter => RankWindow::Week,
        }
    }
}
