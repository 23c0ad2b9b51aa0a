use super::*;
use crate::storage::MemoryStore;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde_json::json;

/// Helper to create a KeyEvent
fn key_event(code: KeyCode) -> KeyEvent {
    let mut event = KeyEvent::new(code, KeyModifiers::empty());
    event.kind = KeyEventKind::Press;
    event
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key_event(key_event(KeyCode::Char(c))).unwrap();
    }
}

fn new_app_with_store(store: MemoryStore) -> App {
    // Nothing listens on the discard port, so stray requests fail fast
    App::new(ApiClient::new("http://127.0.0.1:9"), Arc::new(store), LogConfig::disabled())
}

fn new_app() -> App {
    new_app_with_store(MemoryStore::new())
}

fn ana() -> UserRef {
    UserRef {
        id: 1,
        username: "ana".to_string(),
        email: "ana@example.com".to_string(),
    }
}

fn signed_in_app() -> App {
    let mut app = new_app();
    app.user = Some(ana());
    app.router.navigate(Page::Home, true);
    app
}

fn candidate(id: i64, username: &str) -> Candidate {
    Candidate {
        id,
        username: username.to_string(),
        bio: String::new(),
    }
}

fn post(id: i64, likes: i64) -> Post {
    Post {
        id,
        author_id: 2,
        username: "bo".to_string(),
        content: "ran 5k".to_string(),
        visibility: Visibility::Public,
        created_at: "2024-05-01T08:00:00".to_string(),
        likes,
        comments: 0,
        liked_by_me: Some(false),
    }
}

#[tokio::test]
async fn test_question_mark_toggles_help() {
    let mut app = signed_in_app();

    app.handle_key_event(key_event(KeyCode::Char('?'))).unwrap();
    assert_eq!(app.modal, Some(Modal::Help), "Help modal should be open");

    app.handle_key_event(key_event(KeyCode::Char('?'))).unwrap();
    assert!(app.modal.is_none(), "Help modal should be closed");
}

#[tokio::test]
async fn test_escape_closes_modal_before_anything_else() {
    let mut app = signed_in_app();
    app.modal = Some(Modal::Alert {
        title: "Oops".to_string(),
        message: "bad".to_string(),
    });

    app.handle_key_event(key_event(KeyCode::Esc)).unwrap();

    assert!(app.modal.is_none());
    assert!(app.running, "App should still be running");
}

#[tokio::test]
async fn test_navigation_requires_session() {
    let mut app = new_app();
    assert!(!app.navigate(Page::Feed));
    assert_eq!(app.current_page(), Page::Auth);

    // digits are typed into the username field instead of switching tabs
    app.handle_key_event(key_event(KeyCode::Char('2'))).unwrap();
    assert_eq!(app.current_page(), Page::Auth);
    assert_eq!(app.auth_state.username, "2");
}

#[tokio::test]
async fn test_number_keys_switch_tabs() {
    let mut app = signed_in_app();
    app.handle_key_event(key_event(KeyCode::Char('3'))).unwrap();
    assert_eq!(app.current_page(), Page::Habits);
    app.handle_key_event(key_event(KeyCode::Tab)).unwrap();
    assert_eq!(app.current_page(), Page::Stats);
}

#[tokio::test]
async fn test_login_with_missing_fields_shows_alert() {
    let mut app = new_app();
    type_text(&mut app, "ana");
    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();

    assert!(matches!(app.modal, Some(Modal::Alert { .. })));
    assert!(!app.auth_state.submitting);
    assert_eq!(app.pending_tasks(), 0, "No request should be sent");
}

#[tokio::test]
async fn test_signup_validation_failure_is_a_toast() {
    let mut app = new_app();
    app.auth_state.set_view(AuthView::Signup);
    app.submit_signup();

    assert_eq!(app.toasts.last_message(), Some("All required fields must be filled in"));
    assert_eq!(app.pending_tasks(), 0);
}

#[tokio::test]
async fn test_successful_login_establishes_session() {
    let store = MemoryStore::new();
    let mut app = new_app_with_store(store.clone());
    app.auth_state.username = "ana".to_string();
    app.auth_state.password = "secret1".to_string();

    app.handle_event(AppEvent::LoggedIn(Ok(AuthResponse {
        user: ana(),
        profile: Some(Profile {
            first_name: Some("Ana".to_string()),
            ..Default::default()
        }),
    })));

    assert_eq!(app.user_id(), Some(1));
    assert_eq!(app.current_page(), Page::Home);
    assert_eq!(app.toasts.last_message(), Some("Welcome!"));
    assert!(app.auth_state.password.is_empty(), "Credentials should be cleared");

    let restored = SessionCache::new(Arc::new(store)).load().unwrap();
    assert_eq!(restored.user, ana());
    assert_eq!(restored.profile.unwrap().first_name.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn test_failed_login_opens_alert() {
    let mut app = new_app();
    app.auth_state.submitting = true;

    app.handle_event(AppEvent::LoggedIn(Err(ApiError::Api("Invalid credentials".to_string()))));

    assert!(!app.auth_state.submitting);
    assert_eq!(
        app.modal,
        Some(Modal::Alert {
            title: "Sign in failed".to_string(),
            message: "Invalid credentials".to_string(),
        })
    );
    assert!(app.user.is_none());
}

#[tokio::test]
async fn test_restore_session_from_store() {
    let store = MemoryStore::new();
    SessionCache::new(Arc::new(store.clone())).save(&ana(), None).unwrap();

    let mut app = new_app_with_store(store);
    assert!(app.restore_session());
    assert_eq!(app.current_page(), Page::Home);
    assert_eq!(app.user.as_ref().map(|u| u.username.as_str()), Some("ana"));
}

#[tokio::test]
async fn test_logout_clears_state_and_drops_late_results() {
    let store = MemoryStore::new();
    let mut app = new_app_with_store(store.clone());
    app.handle_event(AppEvent::LoggedIn(Ok(AuthResponse {
        user: ana(),
        profile: None,
    })));
    app.habits_state.habits = vec![Habit {
        id: 4,
        name: "Read".to_string(),
    }];
    let old_epoch = app.epoch;

    app.handle_key_event(key_event(KeyCode::Char('L'))).unwrap();

    assert!(app.user.is_none());
    assert_eq!(app.current_page(), Page::Auth);
    assert!(app.habits_state.habits.is_empty());
    assert_eq!(app.toasts.last_message(), Some("Signed out"));
    assert!(SessionCache::new(Arc::new(store)).load().is_none());

    // a result from the previous session arrives after logout
    let pending = app.pending_tasks();
    app.in_flight += 1;
    app.handle_envelope(Envelope {
        epoch: old_epoch,
        event: AppEvent::Habits(Ok(vec![Habit {
            id: 9,
            name: "Run".to_string(),
        }])),
    });
    assert!(app.habits_state.habits.is_empty());
    assert_eq!(app.pending_tasks(), pending);
}

#[tokio::test]
async fn test_theme_toggle_persists() {
    let store = MemoryStore::new();
    let mut app = new_app_with_store(store.clone());
    app.user = Some(ana());
    app.router.navigate(Page::Stats, true);
    assert_eq!(app.theme, Theme::Light);

    app.handle_key_event(key_event(KeyCode::Char('t'))).unwrap();
    assert_eq!(app.theme, Theme::Dark);

    let reopened = new_app_with_store(store);
    assert_eq!(reopened.theme, Theme::Dark);
}

#[tokio::test]
async fn test_suggestions_exclude_self() {
    let mut app = signed_in_app();
    app.handle_event(AppEvent::Suggestions(Ok(vec![
        candidate(1, "ana"),
        candidate(2, "bo"),
        candidate(3, "cy"),
    ])));

    let names: Vec<_> = app.home_state.carousel.items().iter().map(|c| c.username.as_str()).collect();
    assert_eq!(names, ["bo", "cy"]);
    assert!(!app.home_state.loading);
}

#[tokio::test]
async fn test_home_errors_use_home_title() {
    let mut app = signed_in_app();
    app.handle_event(AppEvent::Suggestions(Err(ApiError::Api("boom".to_string()))));

    let toast = app.toasts.iter().last().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.title.as_deref(), Some("Could not load home"));
}

#[tokio::test]
async fn test_stale_ranking_result_is_dropped() {
    let mut app = signed_in_app();
    app.load_ranking();
    let first = app.home_state.ranking.latest_seq();
    app.cycle_rank_window();
    let second = app.home_state.ranking.latest_seq();
    assert_eq!(app.home_state.ranking.window.days(), 30);

    let rows = |name: &str| {
        Ok(vec![RankEntry {
            user_id: Some(5),
            username: name.to_string(),
            done_days: 6,
        }])
    };
    app.handle_event(AppEvent::Ranking {
        seq: second,
        result: rows("fresh"),
    });
    app.handle_event(AppEvent::Ranking {
        seq: first,
        result: rows("stale"),
    });

    assert_eq!(app.home_state.ranking.entries[0].username, "fresh");
}

#[tokio::test]
async fn test_cancelled_ranking_is_silent() {
    let mut app = signed_in_app();
    app.load_ranking();
    let seq = app.home_state.ranking.latest_seq();
    app.handle_event(AppEvent::Ranking {
        seq,
        result: Err(ApiError::Cancelled),
    });
    assert!(app.toasts.is_empty());
}

#[tokio::test]
async fn test_feed_load_is_single_flight() {
    let mut app = signed_in_app();
    app.router.navigate(Page::Feed, true);

    assert!(app.load_feed(true));
    assert!(!app.load_feed(true), "Second load should be dropped while in flight");

    let page: Vec<Post> = (1..=FEED_PAGE_SIZE as i64).map(|id| post(id, 0)).collect();
    app.handle_event(AppEvent::FeedPage { page: 1, result: Ok(page) });

    assert_eq!(app.feed.posts().len(), FEED_PAGE_SIZE);
    assert!(app.feed.has_more());
    assert!(!app.flight.is_active("feed"));
    assert!(app.load_more_feed());
}

#[tokio::test]
async fn test_failed_like_rolls_back() {
    let mut app = signed_in_app();
    app.feed.apply_page(1, vec![post(7, 3)]);

    app.toggle_like(7);
    assert_eq!(app.feed.posts()[0].likes, 4);
    assert!(app.feed.posts()[0].is_liked());

    app.handle_event(AppEvent::LikeSettled {
        post_id: 7,
        before: LikeSnapshot { liked: false, likes: 3 },
        result: Err(ApiError::Api("Server returned 500 error. Please check the server URL.".to_string())),
    });

    assert_eq!(app.feed.posts()[0].likes, 3);
    assert!(!app.feed.posts()[0].is_liked());
    assert_eq!(app.toasts.len(), 1);
}

#[tokio::test]
async fn test_comment_flow_bumps_counter() {
    let mut app = signed_in_app();
    app.router.navigate(Page::Feed, true);
    app.feed.apply_page(1, vec![post(7, 0)]);

    app.handle_key_event(key_event(KeyCode::Char('i'))).unwrap();
    assert_eq!(app.modal, Some(Modal::Comment { post_id: 7 }));
    type_text(&mut app, "nice");
    assert_eq!(app.feed.thread(7).unwrap().input, "nice");

    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();
    assert!(app.modal.is_none());

    app.handle_event(AppEvent::CommentPosted {
        post_id: 7,
        result: Ok(json!({"id": 1})),
    });
    assert_eq!(app.feed.posts()[0].comments, 1);
    assert!(app.feed.thread(7).unwrap().input.is_empty());
}

#[tokio::test]
async fn test_empty_search_sends_nothing() {
    let mut app = signed_in_app();
    app.router.navigate(Page::Friends, true);
    app.friends_state.results = vec![candidate(3, "cy")];

    app.handle_key_event(key_event(KeyCode::Char('/'))).unwrap();
    assert_eq!(app.friends_state.focus, FriendsFocus::Search);

    app.friends_state.query = "  ".to_string();
    app.search_changed();

    assert!(app.friends_state.results.is_empty());
    assert!(!app.friends_state.searching);
    assert_eq!(app.pending_tasks(), 0);
}

#[tokio::test]
async fn test_search_keeps_only_latest_results() {
    let mut app = signed_in_app();
    app.router.navigate(Page::Friends, true);
    app.friends_state.focus = FriendsFocus::Search;

    type_text(&mut app, "bo");
    let latest = app.friends_state.search_seq;
    assert!(app.friends_state.searching);

    app.handle_event(AppEvent::SearchResults {
        seq: latest - 1,
        result: Ok(vec![candidate(9, "b")]),
    });
    assert!(app.friends_state.results.is_empty(), "Stale results should be ignored");

    app.handle_event(AppEvent::SearchResults {
        seq: latest,
        result: Ok(vec![candidate(1, "ana"), candidate(2, "bo"), candidate(4, "bob")]),
    });
    let names: Vec<_> = app.friends_state.results.iter().map(|c| c.username.as_str()).collect();
    assert_eq!(names, ["bo", "bob"]);
    assert!(!app.friends_state.searching);
}

#[tokio::test]
async fn test_existing_friend_cannot_be_added_from_search() {
    let mut app = signed_in_app();
    app.router.navigate(Page::Friends, true);
    let before = app.pending_tasks();
    app.friends_state.friends = vec![candidate(2, "bo")];
    app.friends_state.results = vec![candidate(2, "bo")];
    app.friends_state.focus = FriendsFocus::Search;

    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();
    assert_eq!(app.pending_tasks(), before);
}

#[tokio::test]
async fn test_add_habit_requires_name() {
    let mut app = signed_in_app();
    app.router.navigate(Page::Habits, true);

    app.handle_key_event(key_event(KeyCode::Char('a'))).unwrap();
    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();

    assert!(matches!(app.modal, Some(Modal::AddHabit { .. })), "Modal stays open");
    let toast = app.toasts.iter().last().unwrap();
    assert_eq!(toast.title.as_deref(), Some("Required field"));
}

#[tokio::test]
async fn test_habit_created_closes_modal() {
    let mut app = signed_in_app();
    app.modal = Some(Modal::AddHabit {
        name: "Read".to_string(),
    });

    app.handle_event(AppEvent::HabitCreated(Ok(CreateHabitResponse { ok: true, id: 3 })));

    assert!(app.modal.is_none());
    assert_eq!(app.toasts.last_message(), Some("Habit added"));
    assert!(app.habits_state.loading && app.stats_state.loading, "Habits and stats reload");
}

#[tokio::test]
async fn test_mark_today_skip_closes_modal() {
    let mut app = signed_in_app();
    app.router.navigate(Page::Habits, true);
    app.habits_state.habits = vec![Habit {
        id: 4,
        name: "Read".to_string(),
    }];
    let before = app.pending_tasks();

    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();
    assert!(matches!(app.modal, Some(Modal::MarkToday { habit_id: 4, .. })));

    app.handle_key_event(key_event(KeyCode::Char('s'))).unwrap();
    assert!(app.modal.is_none());
    assert_eq!(app.pending_tasks(), before + 1);
}

#[tokio::test]
async fn test_profile_update_merges_and_persists() {
    let store = MemoryStore::new();
    let mut app = new_app_with_store(store.clone());
    app.user = Some(ana());
    app.profile = Some(Profile {
        first_name: Some("Ana".to_string()),
        bio: Some("runner".to_string()),
        ..Default::default()
    });
    app.modal = Some(Modal::EditProfile(ProfileForm::default()));

    app.handle_event(AppEvent::ProfileUpdated(Ok(ProfileResponse {
        profile: Some(json!({"first_name": "Anna", "gender": null})),
    })));

    let profile = app.profile.clone().unwrap();
    assert_eq!(profile.first_name.as_deref(), Some("Anna"));
    assert_eq!(profile.bio.as_deref(), Some("runner"), "Untouched keys survive");
    assert!(app.modal.is_none());
    assert!(app.changes_saved_visible(Instant::now()));

    let cached = SessionCache::new(Arc::new(store)).load().unwrap();
    assert_eq!(cached.profile.unwrap().first_name.as_deref(), Some("Anna"));
}

#[tokio::test]
async fn test_visibility_hint_expires() {
    let mut app = signed_in_app();
    app.handle_event(AppEvent::VisibilityUpdated(Ok(ProfileResponse {
        profile: Some(json!({"is_public": true, "bio": "hi"})),
    })));

    assert!(app.profile.as_ref().unwrap().is_public());
    assert_eq!(app.toasts.last_message(), Some("Preferences updated"));
    let now = Instant::now();
    assert!(app.saved_hint_visible(now));

    app.tick_at(now + SAVED_HINT + Duration::from_millis(1));
    assert!(app.profile_state.saved_hint_until.is_none());
}

#[tokio::test]
async fn test_visibility_update_with_numeric_flag() {
    let mut app = signed_in_app();
    app.profile = Some(Profile {
        bio: Some("old".to_string()),
        ..Default::default()
    });
    app.handle_event(AppEvent::VisibilityUpdated(Ok(ProfileResponse {
        profile: Some(json!({"is_public": 1, "bio": "new bio"})),
    })));

    let profile = app.profile.as_ref().unwrap();
    assert!(profile.is_public());
    assert_eq!(profile.bio.as_deref(), Some("new bio"));
    assert_eq!(app.toasts.last_message(), Some("Preferences updated"));
}

#[tokio::test]
async fn test_undecodable_profile_update_keeps_cache_and_reports() {
    let store = MemoryStore::new();
    let mut app = new_app_with_store(store.clone());
    app.user = Some(ana());
    app.profile = Some(Profile {
        bio: Some("old".to_string()),
        ..Default::default()
    });
    app.modal = Some(Modal::Visibility {
        is_public: true,
        bio: "new".to_string(),
    });

    app.handle_event(AppEvent::VisibilityUpdated(Ok(ProfileResponse {
        profile: Some(json!({"is_public": true, "bio": ["not", "text"]})),
    })));

    assert_eq!(app.profile.as_ref().unwrap().bio.as_deref(), Some("old"));
    let toast = app.toasts.iter().last().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert!(!app.saved_hint_visible(Instant::now()));
    assert!(app.modal.is_some());
    assert!(SessionCache::new(Arc::new(store)).load().is_none());
}

#[tokio::test]
async fn test_profile_save_requires_names() {
    let mut app = signed_in_app();
    app.save_profile(&ProfileForm::default());

    let toast = app.toasts.iter().last().unwrap();
    assert_eq!(toast.title.as_deref(), Some("Required fields"));
    assert_eq!(app.pending_tasks(), 0);
}

#[tokio::test]
async fn test_public_profile_ignores_other_user() {
    let mut app = signed_in_app();
    app.open_public_profile("bo");
    assert!(app.public_profile.as_ref().unwrap().loading);

    app.handle_event(AppEvent::PublicProfile {
        username: "cy".to_string(),
        result: Ok((PublicUserView::default(), Vec::new())),
    });
    assert!(app.public_profile.as_ref().unwrap().loading);

    app.handle_event(AppEvent::PublicProfile {
        username: "bo".to_string(),
        result: Err(ApiError::Api("Profile is private".to_string())),
    });
    let overlay = app.public_profile.as_ref().unwrap();
    assert!(!overlay.loading);
    assert_eq!(overlay.error.as_deref(), Some("Profile is private"));

    app.handle_key_event(key_event(KeyCode::Esc)).unwrap();
    assert!(app.public_profile.is_none());
}

#[tokio::test]
async fn test_composer_rejects_blank_post() {
    let mut app = signed_in_app();
    app.router.navigate(Page::Feed, true);

    app.handle_key_event(key_event(KeyCode::Char('n'))).unwrap();
    assert!(app.composer.open);

    let mut save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
    save.kind = KeyEventKind::Press;
    app.handle_key_event(save).unwrap();

    assert!(app.composer.open);
    assert!(!app.composer.submitting);
    assert_eq!(app.toasts.last_message(), Some("Write something first"));
}

#[tokio::test]
async fn test_settle_waits_for_spawned_tasks() {
    let mut app = signed_in_app();
    app.load_stats();
    assert_eq!(app.pending_tasks(), 1);

    app.settle().await;

    assert_eq!(app.pending_tasks(), 0);
    assert!(!app.stats_state.loading);
    // nothing is listening, so the failure surfaces as a toast
    assert_eq!(app.toasts.iter().last().map(|t| t.kind), Some(ToastKind::Error));
}
