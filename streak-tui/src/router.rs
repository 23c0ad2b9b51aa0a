/// Pages of the client. Exactly one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Auth,
    Home,
    Feed,
    Habits,
    Stats,
    Friends,
    Profile,
}

impl Page {
    /// Pages shown in the tab bar once signed in, in order
    pub const TABS: [Page; 6] = [
        Page::Home,
        Page::Feed,
        Page::Habits,
        Page::Stats,
        Page::Friends,
        Page::Profile,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Auth => "Sign in",
            Page::Home => "Home",
            Page::Feed => "Feed",
            Page::Habits => "Habits",
            Page::Stats => "Stats",
            Page::Friends => "Friends",
            Page::Profile => "Profile",
        }
    }

    pub fn tab_index(&self) -> Option<usize> {
        Self::TABS.iter().position(|p| p == self)
    }

    /// Tab reached with a number key (1-based)
    pub fn from_number(n: u32) -> Option<Page> {
        let index = (n as usize).checked_sub(1)?;
        Self::TABS.get(index).copied()
    }

    pub fn next_tab(&self) -> Page {
        match self.tab_index() {
            Some(i) => Self::TABS[(i + 1) % Self::TABS.len()],
            None => Page::Home,
        }
    }

    pub fn previous_tab(&self) -> Page {
        match self.tab_index() {
            Some(i) => Self::TABS[(i + Self::TABS.len() - 1) % Self::TABS.len()],
            None => Page::Home,
        }
    }
}

/// Tracks the visible page and gates navigation on the session.
#[derive(Debug, Default)]
pub struct Router {
    current: Page,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Page {
        self.current
    }

    /// Switches to `page`. Without a session only the auth page is reachable;
    /// a refused navigation leaves the current page untouched and returns false.
    pub fn navigate(&mut self, page: Page, signed_in: bool) -> bool {
        if !signed_in && page != Page::Auth {
            return false;
        }
        self.current = page;
        true
    }
}
