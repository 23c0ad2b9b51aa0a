use anyhow::Result;
use crossterm::event::KeyEvent;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use streak_types::*;

use crate::api::{ApiClient, ApiError, ApiResult, RANK_SIZE, SEARCH_PAGE_SIZE};
use crate::feed::{FeedState, LikeSnapshot, COMMENT_PAGE_SIZE, FEED_PAGE_SIZE};
use crate::flight::SingleFlight;
use crate::logging::LogConfig;
use crate::router::{Page, Router};
use crate::session::{Preferences, SessionCache};
use crate::storage::KeyValueStore;
use crate::toast::{ToastKind, ToastStack};
use crate::validation::{
    truncate_bio, validate_content, validate_habit_name, validate_login, validate_profile_edit,
    validate_signup, ValidationError,
};
use crate::{log_api_call, log_feed, log_navigation, log_session};

pub mod state;
pub use state::*;
pub mod handlers;

#[cfg(test)]
mod tests;

/// Quiet period before a friend search is sent
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);
/// Lifetime of the "Saved" hint after a visibility update
pub const SAVED_HINT: Duration = Duration::from_millis(1800);
/// Lifetime of the "Changes saved." hint after a profile edit
pub const CHANGES_SAVED_HINT: Duration = Duration::from_secs(2);

const FEED_FLIGHT: &str = "feed";
const MY_POSTS_FLIGHT: &str = "my_posts";

/// Outcome of a background request. Every spawned task sends exactly one.
#[derive(Debug)]
pub enum AppEvent {
    LoggedIn(ApiResult<AuthResponse>),
    SignedUp(ApiResult<AuthResponse>),
    Suggestions(ApiResult<Vec<Candidate>>),
    Ranking {
        seq: u64,
        result: ApiResult<Vec<RankEntry>>,
    },
    FeedPage {
        page: u32,
        result: ApiResult<Vec<Post>>,
    },
    LikeSettled {
        post_id: i64,
        before: LikeSnapshot,
        result: ApiResult<LikeResponse>,
    },
    CommentsLoaded {
        post_id: i64,
        result: ApiResult<Vec<Comment>>,
    },
    CommentPosted {
        post_id: i64,
        result: ApiResult<Value>,
    },
    PostCreated(ApiResult<Value>),
    PostDeleted(ApiResult<OkResponse>),
    MyPosts(ApiResult<Vec<Post>>),
    Habits(ApiResult<Vec<Habit>>),
    HabitCreated(ApiResult<CreateHabitResponse>),
    HabitDeleted(ApiResult<OkResponse>),
    MarkedToday {
        done: bool,
        result: ApiResult<OkResponse>,
    },
    Stats(ApiResult<WeeklyStats>),
    Friends(ApiResult<Vec<Candidate>>),
    FriendAdded {
        username: String,
        result: ApiResult<OkResponse>,
    },
    FriendRemoved {
        username: String,
        result: ApiResult<OkResponse>,
    },
    SearchResults {
        seq: u64,
        result: ApiResult<Vec<Candidate>>,
    },
    ProfileUpdated(ApiResult<ProfileResponse>),
    VisibilityUpdated(ApiResult<ProfileResponse>),
    PublicProfile {
        username: String,
        result: ApiResult<(PublicUserView, Vec<Post>)>,
    },
}

impl App {
    pub fn new(api_client: ApiClient, store: Arc<dyn KeyValueStore>, log_config: LogConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let preferences = Preferences::new(store.clone());
        let theme = preferences.theme();

        Self {
            running: true,
            api_client,
            log_config,
            router: Router::new(),
            user: None,
            profile: None,
            theme,
            auth_state: AuthState::default(),
            home_state: HomeState::default(),
            feed: FeedState::new(),
            habits_state: HabitsState::default(),
            stats_state: StatsState::default(),
            friends_state: FriendsState::default(),
            profile_state: ProfileState::default(),
            public_profile: None,
            composer: ComposerState::new(),
            modal: None,
            toasts: ToastStack::new(),
            flight: SingleFlight::new(),
            session_cache: SessionCache::new(store),
            preferences,
            events_tx,
            events_rx,
            in_flight: 0,
            epoch: 0,
        }
    }

    pub fn current_page(&self) -> Page {
        self.router.current()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    // ---- Task plumbing ----

    /// Runs `task` in the background and routes its event back to the loop.
    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        let epoch = self.epoch;
        self.in_flight += 1;
        tokio::spawn(async move {
            let event = task.await;
            // The receiver only disappears when the app is shutting down
            let _ = tx.send(Envelope { epoch, event });
        });
    }

    /// Applies every event that is already waiting.
    pub fn drain_events(&mut self) {
        while let Ok(envelope) = self.events_rx.try_recv() {
            self.handle_envelope(envelope);
        }
    }

    /// Waits until every spawned task, including follow-ups spawned while
    /// handling events, has reported back.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.events_rx.recv().await {
                Some(envelope) => self.handle_envelope(envelope),
                None => break,
            }
        }
    }

    pub fn pending_tasks(&self) -> usize {
        self.in_flight
    }

    fn handle_envelope(&mut self, envelope: Envelope) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if envelope.epoch != self.epoch {
            log::debug!("Dropping result from a previous session: {:?}", envelope.event);
            return;
        }
        self.handle_event(envelope.event);
    }

    /// Surfaces a failed request as an error toast. Cancellations stay silent.
    fn report(&mut self, error: &ApiError, title: Option<&str>) {
        if error.is_cancelled() {
            return;
        }
        log_api_call!(self.log_config, "Request failed: {}", error);
        self.toasts.notify(error.to_string(), ToastKind::Error, title);
    }

    fn report_invalid(&mut self, error: ValidationError) {
        let title = match error {
            ValidationError::MissingFields | ValidationError::MissingName => Some("Required fields"),
            ValidationError::EmptyHabitName => Some("Required field"),
            _ => Some("Error"),
        };
        self.toasts.notify(error.to_string(), ToastKind::Error, title);
    }

    /// Applies the outcome of a background request.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LoggedIn(result) => {
                self.auth_state.submitting = false;
                match result {
                    Ok(resp) => self.establish_session(resp, "Welcome!"),
                    Err(e) => {
                        self.modal = Some(Modal::Alert {
                            title: "Sign in failed".to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            AppEvent::SignedUp(result) => {
                self.auth_state.submitting = false;
                match result {
                    Ok(resp) => self.establish_session(resp, "Account created"),
                    Err(e) => self.report(&e, Some("Error")),
                }
            }
            AppEvent::Suggestions(result) => {
                self.home_state.loading = false;
                match result {
                    Ok(mut candidates) => {
                        let me = self.user_id();
                        candidates.retain(|c| Some(c.id) != me);
                        self.home_state.carousel = crate::carousel::Carousel::new(candidates);
                    }
                    Err(e) => self.report(&e, Some("Could not load home")),
                }
            }
            AppEvent::Ranking { seq, result } => {
                if let Some(message) = self.home_state.ranking.finish(seq, result) {
                    self.toasts.error(message);
                }
            }
            AppEvent::FeedPage { page, result } => {
                self.flight.release(FEED_FLIGHT);
                match result {
                    Ok(posts) => {
                        let received = posts.len();
                        let added = self.feed.apply_page(page, posts);
                        log_feed!(
                            self.log_config,
                            "Feed page {}: {} received, {} new, more={}",
                            page,
                            received,
                            added,
                            self.feed.has_more()
                        );
                    }
                    Err(e) => self.report(&e, Some("Could not load feed")),
                }
            }
            AppEvent::LikeSettled { post_id, before, result } => {
                self.feed.settle_like(post_id, before, &result);
                if let Err(e) = result {
                    log_feed!(self.log_config, "Like on post {} rolled back", post_id);
                    self.report(&e, None);
                }
            }
            AppEvent::CommentsLoaded { post_id, result } => match result {
                Ok(comments) => self.feed.set_comments(post_id, comments),
                Err(e) => {
                    self.feed.comments_failed(post_id);
                    self.report(&e, None);
                }
            },
            AppEvent::CommentPosted { post_id, result } => match result {
                Ok(_) => {
                    self.feed.comment_posted(post_id);
                    self.load_comments(post_id);
                }
                Err(e) => self.report(&e, Some("Could not comment")),
            },
            AppEvent::PostCreated(result) => {
                self.composer.submitting = false;
                match result {
                    Ok(_) => {
                        self.composer.reset();
                        self.toasts.success("Posted");
                        self.refresh_posts();
                    }
                    Err(e) => self.report(&e, Some("Could not publish")),
                }
            }
            AppEvent::PostDeleted(result) => match result {
                Ok(_) => {
                    self.toasts.info("Post deleted");
                    self.refresh_posts();
                }
                Err(e) => self.report(&e, None),
            },
            AppEvent::MyPosts(result) => {
                self.flight.release(MY_POSTS_FLIGHT);
                self.profile_state.loading = false;
                match result {
                    Ok(posts) => {
                        self.profile_state.posts = posts;
                        self.profile_state.selected =
                            clamp_index(self.profile_state.selected, self.profile_state.posts.len());
                    }
                    Err(e) => self.report(&e, None),
                }
            }
            AppEvent::Habits(result) => {
                self.habits_state.loading = false;
                match result {
                    Ok(habits) => {
                        self.habits_state.habits = habits;
                        self.habits_state.selected =
                            clamp_index(self.habits_state.selected, self.habits_state.habits.len());
                    }
                    Err(e) => self.report(&e, None),
                }
            }
            AppEvent::HabitCreated(result) => match result {
                Ok(_) => {
                    self.toasts.success("Habit added");
                    if matches!(self.modal, Some(Modal::AddHabit { .. })) {
                        self.modal = None;
                    }
                    self.load_habits();
                    self.load_stats();
                }
                Err(e) => self.report(&e, Some("Could not add")),
            },
            AppEvent::HabitDeleted(result) => match result {
                Ok(_) => {
                    self.toasts.info("Habit removed");
                    self.load_habits();
                    self.load_stats();
                }
                Err(e) => self.report(&e, None),
            },
            AppEvent::MarkedToday { done, result } => match result {
                Ok(_) => {
                    self.toasts
                        .success(if done { "Marked as done" } else { "Marked as skipped" });
                    self.load_stats();
                }
                Err(e) => self.report(&e, None),
            },
            AppEvent::Stats(result) => {
                self.stats_state.loading = false;
                match result {
                    Ok(stats) => self.stats_state.stats = Some(stats),
                    Err(e) => self.report(&e, None),
                }
            }
            AppEvent::Friends(result) => {
                self.friends_state.loading = false;
                match result {
                    Ok(friends) => {
                        self.friends_state.friends = friends;
                        self.friends_state.selected =
                            clamp_index(self.friends_state.selected, self.friends_state.friends.len());
                    }
                    Err(e) => self.report(&e, Some("Could not load friends")),
                }
            }
            AppEvent::FriendAdded { username, result } => match result {
                Ok(_) => {
                    self.toasts.success(format!("@{} added as a friend", username));
                    self.load_friends();
                    if self.current_page() == Page::Home {
                        self.load_home();
                    }
                }
                Err(e) => self.report(&e, None),
            },
            AppEvent::FriendRemoved { username, result } => match result {
                Ok(_) => {
                    self.toasts.info(format!("@{} removed from friends", username));
                    self.load_friends();
                }
                Err(e) => self.report(&e, None),
            },
            AppEvent::SearchResults { seq, result } => {
                if seq != self.friends_state.search_seq {
                    return;
                }
                self.friends_state.searching = false;
                self.friends_state.search_token = None;
                match result {
                    Ok(mut results) => {
                        let me = self.user_id();
                        results.retain(|c| Some(c.id) != me);
                        self.friends_state.results = results;
                        self.friends_state.result_selected = 0;
                    }
                    Err(e) => self.report(&e, None),
                }
            }
            AppEvent::ProfileUpdated(result) => match result {
                Ok(resp) => {
                    if !self.apply_profile_patch(resp) {
                        self.toasts.notify("Unexpected profile data from server", ToastKind::Error, Some("Could not update"));
                        return;
                    }
                    if matches!(self.modal, Some(Modal::EditProfile(_))) {
                        self.modal = None;
                    }
                    self.profile_state.changes_saved_until = Some(Instant::now() + CHANGES_SAVED_HINT);
                    self.toasts.success("Profile updated");
                }
                Err(e) => self.report(&e, Some("Could not update")),
            },
            AppEvent::VisibilityUpdated(result) => match result {
                Ok(resp) => {
                    if !self.apply_profile_patch(resp) {
                        self.toasts.error("Unexpected profile data from server");
                        return;
                    }
                    if matches!(self.modal, Some(Modal::Visibility { .. })) {
                        self.modal = None;
                    }
                    self.profile_state.saved_hint_until = Some(Instant::now() + SAVED_HINT);
                    self.toasts.success("Preferences updated");
                }
                Err(e) => self.report(&e, None),
            },
            AppEvent::PublicProfile { username, result } => {
                let Some(overlay) = self.public_profile.as_mut() else {
                    return;
                };
                if overlay.username != username {
                    return;
                }
                overlay.loading = false;
                match result {
                    Ok((view, posts)) => {
                        overlay.view = Some(view);
                        overlay.posts = posts;
                    }
                    Err(e) => overlay.error = Some(e.to_string()),
                }
            }
        }
    }

    // ---- Session ----

    /// Restores a cached session, if any, and opens the home page.
    pub fn restore_session(&mut self) -> bool {
        match self.session_cache.load() {
            Some(session) => {
                log_session!(self.log_config, "Restored session for {}", session.user.username);
                self.user = Some(session.user);
                self.profile = session.profile;
                self.navigate(Page::Home);
                true
            }
            None => {
                log_session!(self.log_config, "No cached session");
                false
            }
        }
    }

    fn establish_session(&mut self, resp: AuthResponse, greeting: &str) {
        log_session!(self.log_config, "Signed in as {}", resp.user.username);
        self.user = Some(resp.user);
        self.profile = resp.profile;
        self.persist_session();
        self.auth_state.clear();
        self.toasts.success(greeting);
        self.navigate(Page::Home);
    }

    fn persist_session(&mut self) {
        let Some(user) = self.user.as_ref() else {
            return;
        };
        if let Err(e) = self.session_cache.save(user, self.profile.as_ref()) {
            log::warn!("Failed to save session: {:#}", e);
        }
    }

    /// Merges a `{profile}` response into the cached profile and persists it.
    /// Returns false, leaving the cache untouched, when the patch does not decode.
    fn apply_profile_patch(&mut self, resp: ProfileResponse) -> bool {
        if let Some(patch) = resp.profile {
            let mut profile = self.profile.clone().unwrap_or_default();
            if let Err(e) = profile.merge_json(&patch) {
                log::warn!("Ignoring malformed profile update: {}", e);
                return false;
            }
            self.profile = Some(profile);
        }
        self.persist_session();
        true
    }

    pub fn submit_login(&mut self) {
        if self.auth_state.submitting {
            return;
        }
        let (username, password) = match validate_login(&self.auth_state.username, &self.auth_state.password) {
            Ok(credentials) => credentials,
            Err(e) => {
                self.modal = Some(Modal::Alert {
                    title: "Sign in".to_string(),
                    message: e.to_string(),
                });
                return;
            }
        };

        log_api_call!(self.log_config, "POST /login as {}", username);
        self.auth_state.submitting = true;
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::LoggedIn(api.login(username, password).await) });
    }

    pub fn submit_signup(&mut self) {
        if self.auth_state.submitting {
            return;
        }
        let today = chrono::Local::now().date_naive();
        let request = match validate_signup(&self.auth_state.signup, today) {
            Ok(request) => request,
            Err(e) => return self.report_invalid(e),
        };

        log_api_call!(self.log_config, "POST /signup as {}", request.username);
        self.auth_state.submitting = true;
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::SignedUp(api.signup(&request).await) });
    }

    /// Drops all per-user state, the cached session and any late results.
    pub fn logout(&mut self) {
        log_session!(self.log_config, "Signing out");
        self.epoch += 1;

        if let Some(token) = self.friends_state.search_token.take() {
            token.cancel();
        }
        self.user = None;
        self.profile = None;
        self.home_state = HomeState::default();
        self.feed = FeedState::new();
        self.habits_state = HabitsState::default();
        self.stats_state = StatsState::default();
        self.friends_state = FriendsState::default();
        self.profile_state = ProfileState::default();
        self.public_profile = None;
        self.composer.reset();
        self.modal = None;
        self.flight = SingleFlight::new();

        if let Err(e) = self.session_cache.clear() {
            log::warn!("Failed to clear session: {:#}", e);
        }
        self.toasts.info("Signed out");
        self.navigate(Page::Auth);
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = self.preferences.set_theme(self.theme) {
            log::warn!("Failed to save theme: {:#}", e);
        }
    }

    // ---- Navigation ----

    /// Shows `page` and refreshes its data. Refused without a session
    /// unless the target is the auth page.
    pub fn navigate(&mut self, page: Page) -> bool {
        if !self.router.navigate(page, self.is_signed_in()) {
            log_navigation!(self.log_config, "Refused navigation to {:?}", page);
            return false;
        }
        log_navigation!(self.log_config, "Navigated to {:?}", page);
        self.public_profile = None;
        self.on_enter(page);
        true
    }

    fn on_enter(&mut self, page: Page) {
        match page {
            Page::Auth => self.auth_state.set_view(AuthView::Login),
            Page::Home => self.load_home(),
            Page::Feed => {
                self.load_feed(true);
            }
            Page::Habits => self.load_habits(),
            Page::Stats => self.load_stats(),
            Page::Friends => self.load_friends(),
            Page::Profile => self.load_profile(),
        }
    }

    pub fn next_tab(&mut self) {
        let page = self.current_page().next_tab();
        self.navigate(page);
    }

    pub fn previous_tab(&mut self) {
        let page = self.current_page().previous_tab();
        self.navigate(page);
    }

    // ---- Home ----

    pub fn load_home(&mut self) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        self.home_state.loading = true;
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::Suggestions(api.suggested_friends(user_id).await) });
        self.load_ranking();
    }

    /// Fetches the ranking for the selected window, cancelling any fetch
    /// still in flight.
    pub fn load_ranking(&mut self) {
        let (seq, token) = self.home_state.ranking.begin();
        let window = self.home_state.ranking.window.days();
        log_api_call!(self.log_config, "GET /public/rank window={} (#{})", window, seq);

        let api = self.api_client.clone();
        self.spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => Err(ApiError::Cancelled),
                result = api.rank(window, 1, RANK_SIZE) => result,
            };
            AppEvent::Ranking { seq, result }
        });
    }

    pub fn cycle_rank_window(&mut self) {
        self.home_state.ranking.cycle_window();
        self.load_ranking();
    }

    // ---- Friends ----

    pub fn load_friends(&mut self) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        self.friends_state.loading = true;
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::Friends(api.list_friends(user_id).await) });
    }

    pub fn add_friend(&mut self, target: &Candidate) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        if target.id == user_id {
            return;
        }
        let api = self.api_client.clone();
        let (target_id, username) = (target.id, target.username.clone());
        self.spawn(async move {
            let result = api.add_friend(user_id, target_id).await;
            AppEvent::FriendAdded { username, result }
        });
    }

    pub fn remove_friend(&mut self, target: &Candidate) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        let api = self.api_client.clone();
        let (target_id, username) = (target.id, target.username.clone());
        self.spawn(async move {
            let result = api.remove_friend(user_id, target_id).await;
            AppEvent::FriendRemoved { username, result }
        });
    }

    /// Restarts the debounced search after the query changed. An empty query
    /// clears the results without a request.
    pub fn search_changed(&mut self) {
        if let Some(token) = self.friends_state.search_token.take() {
            token.cancel();
        }
        self.friends_state.search_seq += 1;

        let query = self.friends_state.query.trim().to_string();
        if query.is_empty() {
            self.friends_state.results.clear();
            self.friends_state.searching = false;
            return;
        }

        let seq = self.friends_state.search_seq;
        let token = CancellationToken::new();
        self.friends_state.search_token = Some(token.clone());
        self.friends_state.searching = true;

        let api = self.api_client.clone();
        self.spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => Err(ApiError::Cancelled),
                result = async {
                    tokio::time::sleep(SEARCH_DEBOUNCE).await;
                    api.search_public_users(&query, 1, SEARCH_PAGE_SIZE).await
                } => result,
            };
            AppEvent::SearchResults { seq, result }
        });
    }

    // ---- Feed ----

    /// Loads the first page (`reset`) or the next one. Dropped while another
    /// feed load is in flight; returns whether a request was issued.
    pub fn load_feed(&mut self, reset: bool) -> bool {
        let Some(user_id) = self.user_id() else {
            return false;
        };
        if !self.flight.try_acquire(FEED_FLIGHT) {
            log_feed!(self.log_config, "Feed load already in flight, dropping");
            return false;
        }
        let page = self.feed.begin_load(reset);
        log_feed!(self.log_config, "Loading feed page {} (reset={})", page, reset);

        let api = self.api_client.clone();
        self.spawn(async move {
            let result = api.feed(user_id, page, FEED_PAGE_SIZE).await;
            AppEvent::FeedPage { page, result }
        });
        true
    }

    pub fn load_more_feed(&mut self) -> bool {
        if !self.feed.has_more() {
            return false;
        }
        self.load_feed(false)
    }

    pub fn toggle_like(&mut self, post_id: i64) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        let Some(before) = self.feed.optimistic_like(post_id) else {
            return;
        };
        log_feed!(self.log_config, "Optimistic like toggle on post {}", post_id);

        let api = self.api_client.clone();
        self.spawn(async move {
            let result = api.toggle_like(user_id, post_id).await;
            AppEvent::LikeSettled { post_id, before, result }
        });
    }

    pub fn toggle_comments(&mut self, post_id: i64) {
        if self.feed.toggle_thread(post_id) {
            self.load_comments(post_id);
        }
    }

    fn load_comments(&mut self, post_id: i64) {
        let api = self.api_client.clone();
        self.spawn(async move {
            let result = api.comments(post_id, COMMENT_PAGE_SIZE).await;
            AppEvent::CommentsLoaded { post_id, result }
        });
    }

    /// Opens the comment input of a post, expanding its thread first.
    pub fn open_comment_input(&mut self, post_id: i64) {
        if self.feed.thread(post_id).is_none() {
            self.toggle_comments(post_id);
        }
        self.modal = Some(Modal::Comment { post_id });
    }

    pub fn submit_comment(&mut self, post_id: i64) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        let Some(thread) = self.feed.thread(post_id) else {
            return;
        };
        let content = match validate_content(&thread.input) {
            Ok(content) => content,
            Err(e) => return self.report_invalid(e),
        };

        let api = self.api_client.clone();
        self.spawn(async move {
            let result = api.add_comment(post_id, user_id, content).await;
            AppEvent::CommentPosted { post_id, result }
        });
    }

    // ---- Posts ----

    pub fn open_composer(&mut self) {
        self.composer.reset();
        self.composer.open = true;
    }

    pub fn close_composer(&mut self) {
        self.composer.reset();
    }

    pub fn submit_post(&mut self) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        if self.composer.submitting {
            return;
        }
        let content = match validate_content(&self.composer.content()) {
            Ok(content) => content,
            Err(e) => return self.report_invalid(e),
        };

        self.composer.submitting = true;
        let request = CreatePostRequest {
            user_id,
            content,
            visibility: self.composer.visibility,
        };
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::PostCreated(api.create_post(&request).await) });
    }

    pub fn delete_post(&mut self, post_id: i64) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::PostDeleted(api.delete_post(user_id, post_id).await) });
    }

    /// Reloads whichever post list is on screen after a post was added or removed.
    fn refresh_posts(&mut self) {
        match self.current_page() {
            Page::Feed => {
                self.load_feed(true);
            }
            Page::Profile => self.load_my_posts(),
            _ => {}
        }
    }

    pub fn load_profile(&mut self) {
        self.load_my_posts();
    }

    pub fn load_my_posts(&mut self) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        if !self.flight.try_acquire(MY_POSTS_FLIGHT) {
            return;
        }
        self.profile_state.loading = true;
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::MyPosts(api.my_posts(user_id).await) });
    }

    // ---- Habits & stats ----

    pub fn load_habits(&mut self) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        self.habits_state.loading = true;
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::Habits(api.list_habits(user_id).await) });
    }

    pub fn add_habit(&mut self, name: &str) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        let name = match validate_habit_name(name) {
            Ok(name) => name,
            Err(e) => return self.report_invalid(e),
        };
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::HabitCreated(api.create_habit(user_id, name).await) });
    }

    pub fn delete_habit(&mut self, habit_id: i64) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::HabitDeleted(api.delete_habit(user_id, habit_id).await) });
    }

    /// Records today's outcome: done sends 1, skip sends 0.
    pub fn mark_today(&mut self, habit_id: i64, done: bool) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        let api = self.api_client.clone();
        self.spawn(async move {
            let result = api.mark_today(user_id, habit_id, done).await;
            AppEvent::MarkedToday { done, result }
        });
    }

    pub fn load_stats(&mut self) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        self.stats_state.loading = true;
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::Stats(api.weekly_stats(user_id).await) });
    }

    // ---- Profile ----

    pub fn save_profile(&mut self, form: &ProfileForm) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        let request = match validate_profile_edit(
            user_id,
            &form.first_name,
            &form.last_name,
            &form.gender,
            &form.birth_date,
        ) {
            Ok(request) => request,
            Err(e) => return self.report_invalid(e),
        };
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::ProfileUpdated(api.update_profile(&request).await) });
    }

    pub fn save_visibility(&mut self, is_public: bool, bio: &str) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        let request = VisibilityRequest {
            user_id,
            is_public,
            bio: truncate_bio(bio),
        };
        let api = self.api_client.clone();
        self.spawn(async move { AppEvent::VisibilityUpdated(api.update_visibility(&request).await) });
    }

    /// Opens the public profile overlay of `username` on top of the current page.
    pub fn open_public_profile(&mut self, username: &str) {
        let Some(viewer_id) = self.user_id() else {
            return;
        };
        let username = username.to_string();
        self.public_profile = Some(PublicProfileState {
            username: username.clone(),
            loading: true,
            ..Default::default()
        });

        let api = self.api_client.clone();
        self.spawn(async move {
            let (view, posts) = tokio::join!(api.public_user(&username), api.posts_by_user(&username, viewer_id));
            let result = view.map(|view| {
                let posts = posts.unwrap_or_else(|e| {
                    log::debug!("Posts of @{} unavailable: {}", username, e);
                    Vec::new()
                });
                (view, posts)
            });
            AppEvent::PublicProfile { username, result }
        });
    }

    pub fn close_public_profile(&mut self) {
        self.public_profile = None;
    }

    // ---- Misc ----

    pub fn age(&self) -> Option<i32> {
        self.profile
            .as_ref()
            .and_then(|p| p.age_on(chrono::Local::now().date_naive()))
    }

    pub fn saved_hint_visible(&self, now: Instant) -> bool {
        self.profile_state.saved_hint_until.is_some_and(|until| now < until)
    }

    pub fn changes_saved_visible(&self, now: Instant) -> bool {
        self.profile_state.changes_saved_until.is_some_and(|until| now < until)
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Expires toasts and transient hints.
    pub fn tick_at(&mut self, now: Instant) {
        self.toasts.tick_at(now);
        if !self.saved_hint_visible(now) {
            self.profile_state.saved_hint_until = None;
        }
        if !self.changes_saved_visible(now) {
            self.profile_state.changes_saved_until = None;
        }
    }

    pub fn toggle_help(&mut self) {
        self.modal = match self.modal {
            Some(Modal::Help) => None,
            _ => Some(Modal::Help),
        };
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        handlers::handle_key_event(self, key)
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}
