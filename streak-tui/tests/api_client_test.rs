mod common;

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use streak::api::{ApiClient, ApiError, RANK_SIZE, SEARCH_PAGE_SIZE};

#[tokio::test]
async fn test_login_sends_credentials_and_parses_session() {
    let router = Router::new().route(
        "/login",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body, json!({ "username": "ana", "password": "secret" }));
            Json(json!({
                "user": { "id": 1, "username": "ana", "email": "ana@example.com" },
                "profile": { "first_name": "Ana", "is_public": true }
            }))
        }),
    );
    let (base, _) = common::serve(router).await;

    let resp = ApiClient::new(base)
        .login("ana".to_string(), "secret".to_string())
        .await
        .unwrap();

    assert_eq!(resp.user.id, 1);
    assert_eq!(resp.user.email, "ana@example.com");
    let profile = resp.profile.unwrap();
    assert_eq!(profile.first_name.as_deref(), Some("Ana"));
    assert!(profile.is_public());
}

#[tokio::test]
async fn test_error_detail_becomes_the_message() {
    let router = Router::new().route(
        "/login",
        post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Invalid credentials" }))) }),
    );
    let (base, _) = common::serve(router).await;

    let err = ApiClient::new(base)
        .login("ana".to_string(), "wrong".to_string())
        .await
        .unwrap_err();

    assert!(matches!(&err, ApiError::Api(message) if message == "Invalid credentials"));
    assert_eq!(err.to_string(), "Invalid credentials");
}

#[tokio::test]
async fn test_validation_list_is_flattened() {
    let router = Router::new().route(
        "/habits",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": [{ "msg": "field required" }, { "msg": "too short" }] })),
            )
        }),
    );
    let (base, _) = common::serve(router).await;

    let err = ApiClient::new(base).create_habit(1, "x".to_string()).await.unwrap_err();
    assert_eq!(err.to_string(), "field required; too short");
}

#[tokio::test]
async fn test_html_error_body_is_surfaced_as_text() {
    let router = Router::new().route(
        "/stats/weekly",
        get(|| async { (StatusCode::BAD_GATEWAY, "<html><body>Bad gateway</body></html>") }),
    );
    let (base, _) = common::serve(router).await;

    let err = ApiClient::new(base).weekly_stats(1).await.unwrap_err();
    assert_eq!(err.to_string(), "<html><body>Bad gateway</body></html>");
}

#[tokio::test]
async fn test_plain_and_empty_error_bodies() {
    let router = Router::new()
        .route("/habits", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database is locked") }))
        .route("/friends/list", get(|| async { StatusCode::NOT_FOUND }));
    let (base, _) = common::serve(router).await;
    let api = ApiClient::new(base);

    let err = api.list_habits(1).await.unwrap_err();
    assert_eq!(err.to_string(), "database is locked");

    let err = api.list_friends(1).await.unwrap_err();
    assert_eq!(err.to_string(), "Not Found");
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let err = ApiClient::new("http://127.0.0.1:9").weekly_stats(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.to_string().starts_with("Network error"));
}

#[tokio::test]
async fn test_empty_success_body_is_accepted() {
    let router = Router::new().route("/habits/:id", delete(|| async { StatusCode::OK }));
    let (base, log) = common::serve(router).await;

    let resp = ApiClient::new(base).delete_habit(3, 5).await.unwrap();
    assert!(!resp.ok);
    assert_eq!(log.find("/habits/5").as_deref(), Some("/habits/5?user_id=3"));
}

#[tokio::test]
async fn test_suggested_friends_are_normalized() {
    let router = Router::new().route(
        "/friends/suggested",
        get(|| async {
            Json(json!({
                "users": [
                    { "user_id": 2, "name": "bo" },
                    { "candidate": { "id": 3, "username": "cy", "about": "runner" } },
                    { "id": 2, "username": "bo-again" },
                    { "bio": "no identity" }
                ]
            }))
        }),
    );
    let (base, log) = common::serve(router).await;

    let candidates = ApiClient::new(base).suggested_friends(1).await.unwrap();

    let names: Vec<_> = candidates.iter().map(|c| c.username.as_str()).collect();
    assert_eq!(names, ["bo", "cy"]);
    assert_eq!(candidates[1].bio, "runner");

    let uri = log.find("/friends/suggested").unwrap();
    assert!(uri.contains("user_id=1"));
    assert!(uri.contains("limit=12"));
    assert!(uri.contains("window=30"));
}

#[tokio::test]
async fn test_rank_is_deduplicated_and_capped() {
    let router = Router::new().route(
        "/public/rank",
        get(|| async {
            let mut rows: Vec<Value> = (1..=14)
                .map(|i| json!({ "user_id": i, "username": format!("user{}", i), "done_days": 20 - i }))
                .collect();
            rows.insert(1, json!({ "user_id": 1, "username": "user1", "done_days": 19 }));
            Json(Value::Array(rows))
        }),
    );
    let (base, log) = common::serve(router).await;

    let entries = ApiClient::new(base).rank(90, 1, RANK_SIZE).await.unwrap();

    assert_eq!(entries.len(), RANK_SIZE);
    assert_eq!(entries[0].user_id, Some(1));
    assert_eq!(entries[1].user_id, Some(2));
    assert!(log.find("/public/rank").unwrap().contains("window=90"));
}

#[tokio::test]
async fn test_search_query_is_url_encoded() {
    let router = Router::new().route(
        "/public/users",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            Json(json!([{ "id": 9, "username": params.get("q").cloned().unwrap_or_default() }]))
        }),
    );
    let (base, log) = common::serve(router).await;

    let results = ApiClient::new(base)
        .search_public_users("ana maría&co", 1, SEARCH_PAGE_SIZE)
        .await
        .unwrap();

    assert_eq!(results[0].username, "ana maría&co");
    let uri = log.find("/public/users").unwrap();
    assert!(uri.contains("page_size=30"));
    assert!(!uri.contains(' '));
}

#[tokio::test]
async fn test_public_user_is_flattened() {
    let router = Router::new().route(
        "/public/user/:username",
        get(|Path(username): Path<String>| async move {
            Json(json!({
                "user": { "id": 4, "username": username },
                "profile": { "first_name": "Dee", "bio": "early riser", "is_public": false },
                "done_days": 12
            }))
        }),
    );
    let (base, _) = common::serve(router).await;

    let view = ApiClient::new(base).public_user("dee").await.unwrap();

    assert_eq!(view.id, Some(4));
    assert_eq!(view.username, "dee");
    assert_eq!(view.first_name.as_deref(), Some("Dee"));
    assert_eq!(view.bio, "early riser");
    assert!(!view.is_public);
    assert_eq!(view.done_days, Some(12));
}

#[tokio::test]
async fn test_public_user_without_username_is_an_error() {
    let router = Router::new().route("/public/user/:username", get(|| async { Json(json!({})) }));
    let (base, _) = common::serve(router).await;

    let err = ApiClient::new(base).public_user("ghost").await.unwrap_err();
    assert_eq!(err.to_string(), "Profile of @ghost is not available");
}

#[tokio::test]
async fn test_like_and_comments_round_trip() {
    let router = Router::new()
        .route(
            "/posts/:id/like",
            post(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                assert_eq!(id, 7);
                assert_eq!(body, json!({ "user_id": 1 }));
                Json(json!({ "liked": true, "like_count": 3 }))
            }),
        )
        .route(
            "/posts/:id/comments",
            get(|| async {
                Json(json!({ "comments": [{ "id": 1, "username": "bo", "content": "nice", "created_at": "2024-06-01T10:00:00" }] }))
            })
            .post(|Json(body): Json<Value>| async move {
                assert_eq!(body["content"], "well done");
                Json(json!({ "ok": true }))
            }),
        );
    let (base, log) = common::serve(router).await;
    let api = ApiClient::new(base);

    let like = api.toggle_like(1, 7).await.unwrap();
    assert!(like.liked);
    assert_eq!(like.likes, 3);

    let comments = api.comments(7, 50).await.unwrap();
    assert_eq!(comments[0].content, "nice");
    assert_eq!(log.find("/posts/7/comments").as_deref(), Some("/posts/7/comments?limit=50"));

    api.add_comment(7, 1, "well done".to_string()).await.unwrap();
}
