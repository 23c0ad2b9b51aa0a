//! Paginated feed state: de-duplicated posts, optimistic likes and inline
//! comment threads.
//!
//! Nothing here performs I/O. The app issues the requests and feeds the
//! results back through these methods, which keeps every transition
//! testable without a server.

use std::collections::{HashMap, HashSet};

use streak_types::{Comment, LikeResponse, Post};

/// Posts requested per feed page
pub const FEED_PAGE_SIZE: usize = 8;
/// Comments fetched when a thread is opened
pub const COMMENT_PAGE_SIZE: usize = 50;

/// Like state of a post before an optimistic toggle, used for rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub liked: bool,
    pub likes: i64,
}

/// Expanded comment region of one post.
#[derive(Debug, Default, Clone)]
pub struct CommentThread {
    pub comments: Vec<Comment>,
    pub loading: bool,
    pub input: String,
}

#[derive(Debug)]
pub struct FeedState {
    posts: Vec<Post>,
    /// Ids rendered during the current feed session
    seen: HashSet<i64>,
    /// Last page successfully loaded; 0 before the first load
    page: u32,
    has_more: bool,
    threads: HashMap<i64, CommentThread>,
    pub selected: usize,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            seen: HashSet::new(),
            page: 0,
            has_more: false,
            threads: HashMap::new(),
            selected: 0,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// "Load more" is offered only after a full page came back.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Clears the feed session: posts, seen ids, threads and the cursor.
    pub fn reset(&mut self) {
        self.posts.clear();
        self.seen.clear();
        self.threads.clear();
        self.page = 0;
        self.has_more = false;
        self.selected = 0;
    }

    /// Starts a load. A reset clears the session right away and targets
    /// page 1; otherwise the page after the last loaded one.
    pub fn begin_load(&mut self, reset: bool) -> u32 {
        if reset {
            self.reset();
            1
        } else {
            self.page + 1
        }
    }

    /// Commits a fetched page and returns how many posts were new.
    pub fn apply_page(&mut self, page: u32, items: Vec<Post>) -> usize {
        let full_page = items.len() == FEED_PAGE_SIZE;
        let before = self.posts.len();
        for post in items {
            if self.seen.insert(post.id) {
                self.posts.push(post);
            }
        }
        self.page = page;
        self.has_more = full_page;
        self.posts.len() - before
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.posts.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.posts.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn post_mut(&mut self, post_id: i64) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == post_id)
    }

    /// Flips the like immediately and returns the state to roll back to.
    pub fn optimistic_like(&mut self, post_id: i64) -> Option<LikeSnapshot> {
        let post = self.post_mut(post_id)?;
        let before = LikeSnapshot {
            liked: post.is_liked(),
            likes: post.likes,
        };
        let liked = !before.liked;
        post.liked_by_me = Some(liked);
        post.likes = if liked { before.likes + 1 } else { (before.likes - 1).max(0) };
        Some(before)
    }

    /// Server state wins on success; the snapshot is restored on failure.
    pub fn settle_like<E>(&mut self, post_id: i64, before: LikeSnapshot, result: &Result<LikeResponse, E>) {
        let Some(post) = self.post_mut(post_id) else {
            return;
        };
        match result {
            Ok(resp) => {
                post.liked_by_me = Some(resp.liked);
                post.likes = resp.likes;
            }
            Err(_) => {
                post.liked_by_me = Some(before.liked);
                post.likes = before.likes;
            }
        }
    }

    pub fn thread(&self, post_id: i64) -> Option<&CommentThread> {
        self.threads.get(&post_id)
    }

    pub fn thread_mut(&mut self, post_id: i64) -> Option<&mut CommentThread> {
        self.threads.get_mut(&post_id)
    }

    /// Opens or closes the thread. Returns true when it was opened, in which
    /// case the caller fetches the comments.
    pub fn toggle_thread(&mut self, post_id: i64) -> bool {
        if self.threads.remove(&post_id).is_some() {
            return false;
        }
        self.threads.insert(
            post_id,
            CommentThread {
                loading: true,
                ..Default::default()
            },
        );
        true
    }

    /// Replaces the list of an open thread. Results for closed threads are dropped.
    pub fn set_comments(&mut self, post_id: i64, comments: Vec<Comment>) {
        if let Some(thread) = self.threads.get_mut(&post_id) {
            thread.comments = comments;
            thread.loading = false;
        }
    }

    pub fn comments_failed(&mut self, post_id: i64) {
        if let Some(thread) = self.threads.get_mut(&post_id) {
            thread.loading = false;
        }
    }

    /// A comment was accepted: clear the input and bump the counter by one,
    /// whatever the following reload returns.
    pub fn comment_posted(&mut self, post_id: i64) {
        if let Some(thread) = self.threads.get_mut(&post_id) {
            thread.input.clear();
            thread.loading = true;
        }
        if let Some(post) = self.post_mut(post_id) {
            post.comments += 1;
        }
    }
}
