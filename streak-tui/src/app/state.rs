use std::time::Instant;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tui_textarea::TextArea;

use streak_types::{Candidate, Habit, Post, Profile, PublicUserView, Theme, UserRef, Visibility, WeeklyStats};

use crate::api::ApiClient;
use crate::carousel::Carousel;
use crate::feed::FeedState;
use crate::flight::SingleFlight;
use crate::logging::LogConfig;
use crate::ranking::RankingPanel;
use crate::router::Router;
use crate::session::{Preferences, SessionCache};
use crate::toast::ToastStack;
use crate::validation::SignupForm;

use super::AppEvent;

/// A task result tagged with the session epoch it was started in.
#[derive(Debug)]
pub struct Envelope {
    pub epoch: u64,
    pub event: AppEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthView {
    #[default]
    Login,
    Signup,
}

/// Login and signup forms. `focus` indexes the fields of the active view.
#[derive(Debug, Default)]
pub struct AuthState {
    pub view: AuthView,
    pub username: String,
    pub password: String,
    pub signup: SignupForm,
    pub focus: usize,
    pub submitting: bool,
}

pub const LOGIN_FIELDS: [&str; 2] = ["Username", "Password"];
pub const SIGNUP_FIELDS: [&str; 7] = [
    "Email",
    "Username",
    "Password",
    "First name",
    "Last name",
    "Birth date (YYYY-MM-DD, optional)",
    "Gender (optional)",
];

impl AuthState {
    pub fn field_count(&self) -> usize {
        match self.view {
            AuthView::Login => LOGIN_FIELDS.len(),
            AuthView::Signup => SIGNUP_FIELDS.len(),
        }
    }

    pub fn labels(&self) -> &'static [&'static str] {
        match self.view {
            AuthView::Login => &LOGIN_FIELDS,
            AuthView::Signup => &SIGNUP_FIELDS,
        }
    }

    /// Value of field `index` in the active view.
    pub fn field(&self, index: usize) -> &str {
        match (self.view, index) {
            (AuthView::Login, 0) => &self.username,
            (AuthView::Login, _) => &self.password,
            (AuthView::Signup, 0) => &self.signup.email,
            (AuthView::Signup, 1) => &self.signup.username,
            (AuthView::Signup, 2) => &self.signup.password,
            (AuthView::Signup, 3) => &self.signup.first_name,
            (AuthView::Signup, 4) => &self.signup.last_name,
            (AuthView::Signup, 5) => &self.signup.birth_date,
            (AuthView::Signup, _) => &self.signup.gender,
        }
    }

    pub fn focused_field_mut(&mut self) -> &mut String {
        match (self.view, self.focus) {
            (AuthView::Login, 0) => &mut self.username,
            (AuthView::Login, _) => &mut self.password,
            (AuthView::Signup, 0) => &mut self.signup.email,
            (AuthView::Signup, 1) => &mut self.signup.username,
            (AuthView::Signup, 2) => &mut self.signup.password,
            (AuthView::Signup, 3) => &mut self.signup.first_name,
            (AuthView::Signup, 4) => &mut self.signup.last_name,
            (AuthView::Signup, 5) => &mut self.signup.birth_date,
            (AuthView::Signup, _) => &mut self.signup.gender,
        }
    }

    pub fn is_secret(&self, index: usize) -> bool {
        matches!((self.view, index), (AuthView::Login, 1) | (AuthView::Signup, 2))
    }

    pub fn set_view(&mut self, view: AuthView) {
        self.view = view;
        self.focus = 0;
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.field_count();
    }

    pub fn focus_previous(&mut self) {
        let count = self.field_count();
        self.focus = (self.focus + count - 1) % count;
    }

    pub fn clear(&mut self) {
        *self = Self {
            view: self.view,
            ..Default::default()
        };
    }
}

/// Recommendations and ranking.
#[derive(Debug, Default)]
pub struct HomeState {
    pub carousel: Carousel,
    pub loading: bool,
    pub ranking: RankingPanel,
}

#[derive(Debug, Default)]
pub struct HabitsState {
    pub habits: Vec<Habit>,
    pub selected: usize,
    pub loading: bool,
}

impl HabitsState {
    pub fn selected_habit(&self) -> Option<&Habit> {
        self.habits.get(self.selected)
    }
}

#[derive(Debug, Default)]
pub struct StatsState {
    pub stats: Option<WeeklyStats>,
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FriendsFocus {
    #[default]
    List,
    Search,
}

/// Current friends plus the public profile search.
#[derive(Debug, Default)]
pub struct FriendsState {
    pub friends: Vec<Candidate>,
    pub loading: bool,
    pub focus: FriendsFocus,
    pub selected: usize,
    pub query: String,
    pub results: Vec<Candidate>,
    pub result_selected: usize,
    pub searching: bool,
    pub search_seq: u64,
    pub search_token: Option<CancellationToken>,
}

impl FriendsState {
    pub fn is_friend(&self, id: i64) -> bool {
        self.friends.iter().any(|f| f.id == id)
    }
}

#[derive(Debug, Default)]
pub struct ProfileState {
    pub posts: Vec<Post>,
    pub selected: usize,
    pub loading: bool,
    /// "Saved" hint after a visibility update
    pub saved_hint_until: Option<Instant>,
    /// "Changes saved." hint after a profile edit
    pub changes_saved_until: Option<Instant>,
}

/// Read-only overlay showing another user's public profile and posts.
#[derive(Debug, Default)]
pub struct PublicProfileState {
    pub username: String,
    pub view: Option<PublicUserView>,
    pub posts: Vec<Post>,
    pub loading: bool,
    pub error: Option<String>,
    pub scroll: usize,
}

/// Fields of the profile edit form, in focus order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub birth_date: String,
    pub focus: usize,
}

pub const PROFILE_FIELDS: [&str; 4] = ["First name", "Last name", "Gender", "Birth date (YYYY-MM-DD)"];

impl ProfileForm {
    pub fn from_profile(profile: Option<&Profile>) -> Self {
        let text = |v: Option<&String>| v.cloned().unwrap_or_default();
        Self {
            first_name: text(profile.and_then(|p| p.first_name.as_ref())),
            last_name: text(profile.and_then(|p| p.last_name.as_ref())),
            gender: text(profile.and_then(|p| p.gender.as_ref())),
            birth_date: text(profile.and_then(|p| p.birth_date.as_ref())),
            focus: 0,
        }
    }

    pub fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.first_name,
            1 => &self.last_name,
            2 => &self.gender,
            _ => &self.birth_date,
        }
    }

    pub fn focused_field_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.first_name,
            1 => &mut self.last_name,
            2 => &mut self.gender,
            _ => &mut self.birth_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    Habit { id: i64, name: String },
    Post { id: i64 },
}

/// Blocking overlays. At most one is open; it receives every key.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Help,
    Alert { title: String, message: String },
    AddHabit { name: String },
    MarkToday { habit_id: i64, habit_name: String },
    EditProfile(ProfileForm),
    Visibility { is_public: bool, bio: String },
    Comment { post_id: i64 },
    ConfirmDelete(DeleteTarget),
}

/// Post composer backed by a textarea.
pub struct ComposerState {
    pub open: bool,
    pub textarea: TextArea<'static>,
    pub visibility: Visibility,
    pub submitting: bool,
}

impl ComposerState {
    pub fn new() -> Self {
        Self {
            open: false,
            textarea: TextArea::default(),
            visibility: Visibility::Public,
            submitting: false,
        }
    }

    pub fn content(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ComposerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Main application state
pub struct App {
    pub running: bool,
    pub api_client: ApiClient,
    pub log_config: LogConfig,
    pub router: Router,
    pub user: Option<UserRef>,
    pub profile: Option<Profile>,
    pub theme: Theme,
    pub auth_state: AuthState,
    pub home_state: HomeState,
    pub feed: FeedState,
    pub habits_state: HabitsState,
    pub stats_state: StatsState,
    pub friends_state: FriendsState,
    pub profile_state: ProfileState,
    pub public_profile: Option<PublicProfileState>,
    pub composer: ComposerState,
    pub modal: Option<Modal>,
    pub toasts: ToastStack,
    pub flight: SingleFlight,
    pub session_cache: SessionCache,
    pub preferences: Preferences,
    pub(crate) events_tx: UnboundedSender<Envelope>,
    pub(crate) events_rx: UnboundedReceiver<Envelope>,
    /// Spawned tasks whose event has not been handled yet
    pub(crate) in_flight: usize,
    /// Bumped on logout so late results of the previous session are dropped
    pub(crate) epoch: u64,
}
