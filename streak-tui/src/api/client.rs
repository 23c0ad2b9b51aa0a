use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{ApiError, ApiResult};
use streak_types::*;

/// Number of recommendations requested for the home carousel
pub const SUGGESTED_LIMIT: u32 = 12;
/// Activity window (days) the backend uses to rank recommendations
pub const SUGGESTED_WINDOW: u32 = 30;
/// Size of the public ranking
pub const RANK_SIZE: usize = 10;
/// Page size of the public profile search
pub const SEARCH_PAGE_SIZE: u32 = 30;

/// API client for the habits backend.
///
/// Stateless apart from the base URL: the backend identifies the caller by the
/// `user_id` carried in each request, so cloning the client is cheap and every
/// background task gets its own handle.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default `application/json` content type, then caller headers on top.
    /// Shallow merge: a caller key replaces the default outright.
    pub fn merged_headers(extra: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in extra {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => log::warn!("Dropping invalid header {:?}", name),
            }
        }
        headers
    }

    /// Issue a request against `base_url + path` and decode the JSON body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!(target: "api_calls", "{} {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(Self::merged_headers(headers));
        if let Some(body) = body {
            req = req.body(serde_json::to_vec(&body)?);
        }

        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// Helper to handle API responses
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            // Some endpoints answer with an empty body
            let body: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
            return Ok(serde_json::from_slice(body)?);
        }

        let error_text = response.text().await.unwrap_or_default();
        let message = normalize_error_body(&error_text).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

        log::warn!(target: "api_calls", "HTTP {}: {}", status.as_u16(), message);
        Err(ApiError::Api(message))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::GET, path, None, &[]).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::DELETE, path, None, &[]).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body)?;
        self.request(method, path, Some(body), &[]).await
    }

    // Authentication endpoints

    pub async fn login(&self, username: String, password: String) -> ApiResult<AuthResponse> {
        let request = LoginRequest { username, password };
        self.send_json(Method::POST, "/login", &request).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<AuthResponse> {
        self.send_json(Method::POST, "/signup", request).await
    }

    // Profile endpoints

    pub async fn update_profile(&self, request: &ProfileUpdateRequest) -> ApiResult<ProfileResponse> {
        self.send_json(Method::PUT, "/profile", request).await
    }

    pub async fn update_visibility(&self, request: &VisibilityRequest) -> ApiResult<ProfileResponse> {
        self.send_json(Method::PUT, "/profile/visibility", request).await
    }

    /// Public profile of any user
    pub async fn public_user(&self, username: &str) -> ApiResult<PublicUserView> {
        let path = format!("/public/user/{}", urlencoding::encode(username));
        let value: Value = self.get(&path).await?;
        PublicUserView::from_value(&value)
            .ok_or_else(|| ApiError::Api(format!("Profile of @{} is not available", username)))
    }

    // Habit endpoints

    pub async fn list_habits(&self, user_id: i64) -> ApiResult<Vec<Habit>> {
        let response: HabitsResponse = self.get(&format!("/habits?user_id={}", user_id)).await?;
        Ok(response.habits)
    }

    pub async fn create_habit(&self, user_id: i64, name: String) -> ApiResult<CreateHabitResponse> {
        let request = CreateHabitRequest { user_id, name };
        self.send_json(Method::POST, "/habits", &request).await
    }

    pub async fn delete_habit(&self, user_id: i64, habit_id: i64) -> ApiResult<OkResponse> {
        self.delete(&format!("/habits/{}?user_id={}", habit_id, user_id))
            .await
    }

    pub async fn mark_today(&self, user_id: i64, habit_id: i64, done: bool) -> ApiResult<OkResponse> {
        let request = MarkTodayRequest {
            user_id,
            habit_id,
            value: u8::from(done),
        };
        self.send_json(Method::POST, "/logs/mark_today", &request).await
    }

    pub async fn weekly_stats(&self, user_id: i64) -> ApiResult<WeeklyStats> {
        self.get(&format!("/stats/weekly?user_id={}", user_id)).await
    }

    // Social endpoints

    pub async fn suggested_friends(&self, user_id: i64) -> ApiResult<Vec<Candidate>> {
        let path = format!(
            "/friends/suggested?user_id={}&limit={}&window={}",
            user_id, SUGGESTED_LIMIT, SUGGESTED_WINDOW
        );
        let listing: Listing<Value> = self.get(&path).await?;
        Ok(normalize_candidates(&listing.into_items()))
    }

    pub async fn list_friends(&self, user_id: i64) -> ApiResult<Vec<Candidate>> {
        let listing: Listing<Value> = self.get(&format!("/friends/list?user_id={}", user_id)).await?;
        Ok(normalize_candidates(&listing.into_items()))
    }

    pub async fn add_friend(&self, user_id: i64, target_id: i64) -> ApiResult<OkResponse> {
        let request = FriendRequest { user_id, target_id };
        self.send_json(Method::POST, "/friends/add", &request).await
    }

    pub async fn remove_friend(&self, user_id: i64, target_id: i64) -> ApiResult<OkResponse> {
        self.delete(&format!(
            "/friends/remove?user_id={}&target_id={}",
            user_id, target_id
        ))
        .await
    }

    /// Search public profiles by username
    pub async fn search_public_users(&self, query: &str, page: u32, page_size: u32) -> ApiResult<Vec<Candidate>> {
        let path = format!(
            "/public/users?q={}&page={}&page_size={}",
            urlencoding::encode(query),
            page,
            page_size
        );
        let listing: Listing<Value> = self.get(&path).await?;
        Ok(normalize_candidates(&listing.into_items()))
    }

    /// Top users by completed days in the given window, de-duplicated by identity
    pub async fn rank(&self, window_days: u32, page: u32, page_size: usize) -> ApiResult<Vec<RankEntry>> {
        let path = format!(
            "/public/rank?window={}&page={}&page_size={}",
            window_days, page, page_size
        );
        let listing: Listing<Value> = self.get(&path).await?;
        Ok(normalize_ranking(&listing.into_items(), page_size))
    }

    // Post endpoints

    pub async fn feed(&self, user_id: i64, page: u32, page_size: usize) -> ApiResult<Vec<Post>> {
        let path = format!(
            "/posts/feed?user_id={}&page={}&page_size={}",
            user_id, page, page_size
        );
        let listing: Listing<Post> = self.get(&path).await?;
        Ok(listing.into_items())
    }

    /// Posts written by the signed-in user
    pub async fn my_posts(&self, user_id: i64) -> ApiResult<Vec<Post>> {
        let listing: Listing<Post> = self.get(&format!("/posts?user_id={}", user_id)).await?;
        Ok(listing.into_items())
    }

    /// Posts of another user, filtered by what `viewer_id` may see
    pub async fn posts_by_user(&self, username: &str, viewer_id: i64) -> ApiResult<Vec<Post>> {
        let path = format!(
            "/posts/by_user?username={}&viewer_id={}",
            urlencoding::encode(username),
            viewer_id
        );
        let listing: Listing<Post> = self.get(&path).await?;
        Ok(listing.into_items())
    }

    pub async fn create_post(&self, request: &CreatePostRequest) -> ApiResult<Value> {
        self.send_json(Method::POST, "/posts", request).await
    }

    pub async fn delete_post(&self, user_id: i64, post_id: i64) -> ApiResult<OkResponse> {
        self.delete(&format!("/posts/{}?user_id={}", post_id, user_id))
            .await
    }

    /// Toggle the caller's like; the backend answers with the authoritative state
    pub async fn toggle_like(&self, user_id: i64, post_id: i64) -> ApiResult<LikeResponse> {
        let request = LikeRequest { user_id };
        self.send_json(Method::POST, &format!("/posts/{}/like", post_id), &request)
            .await
    }

    pub async fn comments(&self, post_id: i64, limit: usize) -> ApiResult<Vec<Comment>> {
        let path = format!("/posts/{}/comments?limit={}", post_id, limit);
        let listing: Listing<Comment> = self.get(&path).await?;
        Ok(listing.into_items())
    }

    pub async fn add_comment(&self, post_id: i64, user_id: i64, content: String) -> ApiResult<Value> {
        let request = CreateCommentRequest { user_id, content };
        self.send_json(Method::POST, &format!("/posts/{}/comments", post_id), &request)
            .await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SERVER_URL)
    }
}

/// Extracts a human-readable message from an error body.
///
/// JSON bodies yield their `detail` or `message` field (FastAPI validation
/// lists are flattened to their `msg` entries), other JSON is echoed back,
/// and non-JSON text is returned as-is. Empty bodies yield `None` so the
/// caller can fall back to the status text.
pub fn normalize_error_body(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let json = match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => json,
        Err(_) => return Some(trimmed.to_string()),
    };

    match json {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        Value::Object(ref map) => {
            let field = ["detail", "message"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find(|v| is_truthy(v));
            match field {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Array(items)) => Some(flatten_validation_errors(items)),
                Some(other) => Some(other.to_string()),
                None => Some(json.to_string()),
            }
        }
        other => Some(other.to_string()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        _ => true,
    }
}

fn flatten_validation_errors(items: &[Value]) -> String {
    let messages: Vec<&str> = items
        .iter()
        .filter_map(|item| item.get("msg").and_then(Value::as_str))
        .collect();
    if messages.is_empty() {
        Value::Array(items.to_vec()).to_string()
    } else {
        messages.join("; ")
    }
}
