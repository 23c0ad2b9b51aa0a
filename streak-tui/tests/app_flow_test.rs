mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use streak::api::ApiClient;
use streak::app::{App, ProfileForm};
use streak::logging::LogConfig;
use streak::router::Page;
use streak::session::SessionCache;
use streak::storage::{FileStore, MemoryStore};
use streak_types::{Profile, UserRef};

fn app_for(base: &str) -> App {
    App::new(ApiClient::new(base), Arc::new(MemoryStore::new()), LogConfig::disabled())
}

fn sign_in(app: &mut App) {
    app.user = Some(UserRef {
        id: 1,
        username: "ana".to_string(),
        email: "ana@example.com".to_string(),
    });
}

fn post_json(id: i64, likes: i64) -> Value {
    json!({
        "id": id,
        "author_id": 2,
        "username": "bo",
        "content": format!("post {}", id),
        "visibility": "public",
        "created_at": "2024-06-01T09:30:00",
        "likes": likes,
        "comments": 0,
        "liked_by_me": false
    })
}

fn auth_router() -> Router {
    Router::new()
        .route(
            "/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] != "secret" {
                    return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Invalid credentials" })));
                }
                (
                    StatusCode::OK,
                    Json(json!({
                        "user": { "id": 1, "username": "ana", "email": "ana@example.com" },
                        "profile": { "first_name": "Ana", "last_name": "Ruiz", "is_public": true }
                    })),
                )
            }),
        )
        .route(
            "/friends/suggested",
            get(|| async {
                Json(json!([
                    { "id": 1, "username": "ana" },
                    { "id": 2, "username": "bo" },
                    { "id": 3, "username": "cy" }
                ]))
            }),
        )
        .route(
            "/public/rank",
            get(|| async {
                Json(json!({ "items": [
                    { "user_id": 2, "username": "bo", "done_days": 6 },
                    { "user_id": 3, "username": "cy", "done_days": 4 }
                ] }))
            }),
        )
}

#[tokio::test]
async fn test_login_opens_home_with_suggestions_and_ranking() {
    let (base, log) = common::serve(auth_router()).await;
    let store = Arc::new(MemoryStore::new());
    let mut app = App::new(ApiClient::new(base), store.clone(), LogConfig::disabled());

    app.auth_state.username = "  ana ".to_string();
    app.auth_state.password = "secret".to_string();
    app.submit_login();
    app.settle().await;

    assert_eq!(app.current_page(), Page::Home);
    assert_eq!(app.toasts.last_message(), Some("Welcome!"));
    assert!(app.auth_state.username.is_empty());

    let suggested: Vec<_> = app.home_state.carousel.items().iter().map(|c| c.id).collect();
    assert_eq!(suggested, [2, 3]);
    assert_eq!(app.home_state.ranking.entries.len(), 2);
    assert!(log.find("/public/rank").unwrap().contains("window=7"));

    let session = SessionCache::new(store).load().unwrap();
    assert_eq!(session.user.username, "ana");
    assert_eq!(session.profile.unwrap().last_name.as_deref(), Some("Ruiz"));
}

#[tokio::test]
async fn test_wrong_password_keeps_the_auth_page() {
    let (base, _) = common::serve(auth_router()).await;
    let mut app = app_for(&base);

    app.auth_state.username = "ana".to_string();
    app.auth_state.password = "nope".to_string();
    app.submit_login();
    app.settle().await;

    assert_eq!(app.current_page(), Page::Auth);
    assert!(!app.auth_state.submitting);
    assert!(matches!(
        &app.modal,
        Some(streak::app::Modal::Alert { message, .. }) if message == "Invalid credentials"
    ));
}

#[tokio::test]
async fn test_session_survives_restart_on_disk() {
    let (base, _) = common::serve(auth_router()).await;
    let dir = TempDir::new().unwrap();

    let mut first = App::new(ApiClient::new(base.clone()), Arc::new(FileStore::new(dir.path())), LogConfig::disabled());
    first.auth_state.username = "ana".to_string();
    first.auth_state.password = "secret".to_string();
    first.submit_login();
    first.settle().await;
    first.toggle_theme();
    let theme = first.theme;

    let mut second = App::new(ApiClient::new(base), Arc::new(FileStore::new(dir.path())), LogConfig::disabled());
    assert!(second.restore_session());
    second.settle().await;

    assert_eq!(second.user_id(), Some(1));
    assert_eq!(second.current_page(), Page::Home);
    assert_eq!(second.theme, theme);
}

#[tokio::test]
async fn test_feed_pages_until_a_short_page_and_likes_settle_on_server_state() {
    let router = Router::new()
        .route(
            "/posts/feed",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let posts: Vec<Value> = match params.get("page").map(String::as_str) {
                    Some("1") => (1..=8).map(|id| post_json(id, 1)).collect(),
                    // Page two repeats post 8
                    _ => (8..=11).map(|id| post_json(id, 0)).collect(),
                };
                Json(json!({ "posts": posts }))
            }),
        )
        .route(
            "/posts/:id/like",
            post(|| async { Json(json!({ "liked": true, "likes": 10 })) }),
        );
    let (base, log) = common::serve(router).await;
    let mut app = app_for(&base);
    sign_in(&mut app);

    assert!(app.navigate(Page::Feed));
    app.settle().await;
    assert_eq!(app.feed.posts().len(), 8);
    assert!(app.feed.has_more());

    assert!(app.load_more_feed());
    app.settle().await;
    assert_eq!(app.feed.posts().len(), 11);
    assert!(!app.feed.has_more());
    assert!(!app.load_more_feed());
    assert_eq!(log.count("/posts/feed"), 2);

    app.toggle_like(3);
    assert_eq!(app.feed.posts()[2].likes, 2);
    app.settle().await;
    let post = &app.feed.posts()[2];
    assert!(post.is_liked());
    assert_eq!(post.likes, 10);
}

#[derive(Clone, Default)]
struct HabitBackend {
    habits: Arc<Mutex<Vec<Value>>>,
    marks: Arc<Mutex<Vec<Value>>>,
}

fn habit_router(state: HabitBackend) -> Router {
    Router::new()
        .route(
            "/habits",
            get(|State(s): State<HabitBackend>| async move {
                let habits = s.habits.lock().unwrap().clone();
                Json(json!({ "habits": habits }))
            })
            .post(|State(s): State<HabitBackend>, Json(body): Json<Value>| async move {
                let mut habits = s.habits.lock().unwrap();
                let id = habits.len() as i64 + 10;
                habits.push(json!({ "id": id, "name": body["name"] }));
                Json(json!({ "ok": true, "id": id }))
            }),
        )
        .route(
            "/habits/:id",
            delete(|State(s): State<HabitBackend>, Path(id): Path<i64>| async move {
                s.habits.lock().unwrap().retain(|h| h["id"] != id);
                Json(json!({ "ok": true }))
            }),
        )
        .route(
            "/logs/mark_today",
            post(|State(s): State<HabitBackend>, Json(body): Json<Value>| async move {
                s.marks.lock().unwrap().push(body);
                Json(json!({ "ok": true }))
            }),
        )
        .route(
            "/stats/weekly",
            get(|State(s): State<HabitBackend>| async move {
                let done = s.marks.lock().unwrap().iter().filter(|m| m["value"] == 1).count();
                let today_done = done > 0;
                let items: Vec<Value> = s
                    .habits
                    .lock()
                    .unwrap()
                    .iter()
                    .map(|h| json!({
                        "habit_id": h["id"],
                        "habit_name": h["name"],
                        "done": done,
                        "total_days": 7,
                        "today_done": today_done
                    }))
                    .collect();
                Json(json!({ "today": "2024-06-01", "items": items }))
            }),
        )
        .with_state(state)
}

#[tokio::test]
async fn test_habit_lifecycle_refreshes_list_and_stats() {
    let backend = HabitBackend::default();
    let (base, _) = common::serve(habit_router(backend.clone())).await;
    let mut app = app_for(&base);
    sign_in(&mut app);

    app.navigate(Page::Habits);
    app.settle().await;
    assert!(app.habits_state.habits.is_empty());

    app.add_habit("  Read  ");
    app.settle().await;
    assert_eq!(app.toasts.last_message(), Some("Habit added"));
    let habit = app.habits_state.habits[0].clone();
    assert_eq!(habit.name, "Read");
    assert_eq!(app.stats_state.stats.as_ref().unwrap().items.len(), 1);

    app.mark_today(habit.id, true);
    app.settle().await;
    assert_eq!(app.toasts.last_message(), Some("Marked as done"));
    assert_eq!(backend.marks.lock().unwrap()[0]["value"], 1);
    let stats = app.stats_state.stats.clone().unwrap();
    assert!(stats.items[0].today_done);
    assert_eq!(stats.items[0].percent(), 14);

    app.mark_today(habit.id, false);
    app.settle().await;
    assert_eq!(app.toasts.last_message(), Some("Marked as skipped"));
    assert_eq!(backend.marks.lock().unwrap()[1]["value"], 0);

    app.delete_habit(habit.id);
    app.settle().await;
    assert_eq!(app.toasts.last_message(), Some("Habit removed"));
    assert!(app.habits_state.habits.is_empty());
}

#[tokio::test]
async fn test_backend_error_detail_reaches_the_toast() {
    let router = Router::new().route(
        "/habits",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "db down" }))) }),
    );
    let (base, _) = common::serve(router).await;
    let mut app = app_for(&base);
    sign_in(&mut app);

    app.navigate(Page::Habits);
    app.settle().await;

    assert!(!app.habits_state.loading);
    assert_eq!(app.toasts.last_message(), Some("db down"));
}

#[tokio::test]
async fn test_debounced_search_then_add_friend() {
    let friends: Arc<Mutex<Vec<Value>>> = Arc::default();
    let router = Router::new()
        .route(
            "/friends/list",
            get(|State(f): State<Arc<Mutex<Vec<Value>>>>| async move {
                let friends = f.lock().unwrap().clone();
                Json(json!({ "friends": friends }))
            }),
        )
        .route(
            "/friends/add",
            post(|State(f): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                f.lock().unwrap().push(json!({ "id": body["target_id"], "username": "bo" }));
                Json(json!({ "ok": true }))
            }),
        )
        .route(
            "/public/users",
            get(|| async {
                Json(json!([
                    { "id": 1, "username": "ana" },
                    { "id": 2, "username": "bo" }
                ]))
            }),
        )
        .with_state(friends.clone());
    let (base, log) = common::serve(router).await;
    let mut app = app_for(&base);
    sign_in(&mut app);

    app.navigate(Page::Friends);
    app.settle().await;
    assert!(app.friends_state.friends.is_empty());

    app.friends_state.query = "b".to_string();
    app.search_changed();
    app.friends_state.query = "bo".to_string();
    app.search_changed();
    app.settle().await;

    assert_eq!(log.count("/public/users"), 1);
    assert!(log.find("/public/users").unwrap().contains("q=bo"));
    let results = app.friends_state.results.clone();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].username, "bo");

    app.add_friend(&results[0]);
    app.settle().await;
    assert_eq!(app.toasts.last_message(), Some("@bo added as a friend"));
    assert!(app.friends_state.is_friend(2));
    assert_eq!(friends.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_profile_save_merges_partial_response() {
    let router = Router::new().route(
        "/profile",
        put(|Json(body): Json<Value>| async move {
            Json(json!({ "profile": { "first_name": body["first_name"], "last_name": body["last_name"] } }))
        }),
    );
    let (base, _) = common::serve(router).await;
    let store = Arc::new(MemoryStore::new());
    let mut app = App::new(ApiClient::new(base), store.clone(), LogConfig::disabled());
    sign_in(&mut app);
    app.profile = Some(Profile {
        first_name: Some("A".to_string()),
        bio: Some("early riser".to_string()),
        is_public: Some(true),
        ..Default::default()
    });

    let form = ProfileForm {
        first_name: " Ana ".to_string(),
        last_name: "Ruiz".to_string(),
        ..Default::default()
    };
    app.save_profile(&form);
    app.settle().await;

    let profile = app.profile.clone().unwrap();
    assert_eq!(profile.first_name.as_deref(), Some("Ana"));
    assert_eq!(profile.last_name.as_deref(), Some("Ruiz"));
    assert_eq!(profile.bio.as_deref(), Some("early riser"));
    assert!(app.changes_saved_visible(Instant::now()));
    assert_eq!(app.toasts.last_message(), Some("Profile updated"));

    let cached = SessionCache::new(store).load().unwrap().profile.unwrap();
    assert_eq!(cached, profile);
}

#[tokio::test]
async fn test_public_profile_tolerates_missing_posts() {
    let router = Router::new()
        .route(
            "/public/user/:username",
            get(|Path(username): Path<String>| async move {
                Json(json!({ "id": 2, "username": username, "bio": "cyclist", "done_days": 9 }))
            }),
        )
        .route(
            "/posts/by_user",
            get(|| async { (StatusCode::FORBIDDEN, Json(json!({ "detail": "Private profile" }))) }),
        );
    let (base, _) = common::serve(router).await;
    let mut app = app_for(&base);
    sign_in(&mut app);

    app.open_public_profile("bo");
    app.settle().await;

    let overlay = app.public_profile.as_ref().unwrap();
    assert!(!overlay.loading);
    assert!(overlay.error.is_none());
    assert!(overlay.posts.is_empty());
    let view = overlay.view.as_ref().unwrap();
    assert_eq!(view.bio, "cyclist");
    assert_eq!(view.done_days, Some(9));
}
