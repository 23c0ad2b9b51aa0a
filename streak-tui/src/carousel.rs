use streak_types::Candidate;

/// Number of recommendation cards visible at once
pub const CAROUSEL_WINDOW: usize = 3;

/// Recommended friends shown a fixed window at a time.
#[derive(Debug, Default, Clone)]
pub struct Carousel {
    items: Vec<Candidate>,
    offset: usize,
    /// Highlighted card inside the visible window
    pub cursor: usize,
}

impl Carousel {
    pub fn new(items: Vec<Candidate>) -> Self {
        Self {
            items,
            offset: 0,
            cursor: 0,
        }
    }

    pub fn items(&self) -> &[Candidate] {
        &self.items
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Paging controls only exist when there is more than one window of cards
    pub fn has_paging(&self) -> bool {
        self.items.len() > CAROUSEL_WINDOW
    }

    pub fn visible(&self) -> &[Candidate] {
        let end = (self.offset + CAROUSEL_WINDOW).min(self.items.len());
        &self.items[self.offset..end]
    }

    pub fn next(&mut self) {
        if !self.has_paging() {
            return;
        }
        let max_offset = self.items.len() - CAROUSEL_WINDOW;
        self.offset = (self.offset + CAROUSEL_WINDOW).min(max_offset);
        self.clamp_cursor();
    }

    pub fn prev(&mut self) {
        if !self.has_paging() {
            return;
        }
        self.offset = self.offset.saturating_sub(CAROUSEL_WINDOW);
        self.clamp_cursor();
    }

    pub fn cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        } else {
            self.prev();
        }
    }

    pub fn cursor_right(&mut self) {
        if self.cursor + 1 < self.visible().len() {
            self.cursor += 1;
        } else {
            self.next();
        }
    }

    pub fn selected(&self) -> Option<&Candidate> {
        self.visible().get(self.cursor)
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}
