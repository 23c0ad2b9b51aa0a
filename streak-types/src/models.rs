use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::Visibility;
use crate::normalize::{lenient_bool, lenient_flag};

/// Identity returned by the backend on login/signup. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Mutable profile data. Every field is optional because the backend only
/// returns the columns it knows about for a given endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_public: Option<bool>,
}

impl Profile {
    /// Shallow merge: every key present in `patch` overwrites the current value,
    /// explicit nulls included. Non-object patches are ignored.
    pub fn merge_json(&mut self, patch: &Value) -> serde_json::Result<()> {
        let Value::Object(fields) = patch else {
            return Ok(());
        };

        let mut current = serde_json::to_value(&*self)?;
        if let Value::Object(map) = &mut current {
            for (key, value) in fields {
                map.insert(key.clone(), value.clone());
            }
        }
        *self = serde_json::from_value(current)?;
        Ok(())
    }

    /// Age in whole years on `today`, or `None` when the birth date is missing or unparseable.
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        let birth = NaiveDate::parse_from_str(self.birth_date.as_deref()?.trim(), "%Y-%m-%d").ok()?;
        Some(age_between(birth, today))
    }

    pub fn is_public(&self) -> bool {
        self.is_public.unwrap_or(false)
    }
}

/// Completed years between two dates; the birthday itself counts as completed.
pub fn age_between(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyStatItem {
    pub habit_id: i64,
    pub habit_name: String,
    pub done: i64,
    pub total_days: i64,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub today_done: bool,
}

impl WeeklyStatItem {
    /// Completion percentage rounded to the nearest integer.
    pub fn percent(&self) -> i64 {
        if self.total_days <= 0 {
            return 0;
        }
        ((self.done as f64 / self.total_days as f64) * 100.0).round() as i64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub today: String,
    #[serde(default)]
    pub items: Vec<WeeklyStatItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub author_id: i64,
    #[serde(default)]
    pub username: String,
    pub content: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub comments: i64,
    /// Whether the viewer has liked this post (only sent on authenticated reads)
    #[serde(default, deserialize_with = "lenient_bool")]
    pub liked_by_me: Option<bool>,
}

impl Post {
    pub fn is_liked(&self) -> bool {
        self.liked_by_me.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    pub content: String,
    #[serde(default)]
    pub created_at: String,
}

/// Body of a list endpoint. The backend is not consistent about wrapping lists,
/// so both a bare array and the common envelopes are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Wrapped(ListingEnvelope<T>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingEnvelope<T> {
    #[serde(
        alias = "posts",
        alias = "comments",
        alias = "friends",
        alias = "habits",
        alias = "users"
    )]
    pub items: Vec<T>,
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Wrapped(envelope) => envelope.items,
        }
    }
}

// Request/Response types for API
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserRef,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisibilityRequest {
    pub user_id: i64,
    pub is_public: bool,
    pub bio: String,
}

/// `{profile}` as returned by the profile endpoints. Kept untyped so that
/// partial updates can be merged key by key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub profile: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitsResponse {
    #[serde(default)]
    pub habits: Vec<Habit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateHabitRequest {
    pub user_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHabitResponse {
    #[serde(default)]
    pub ok: bool,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkTodayRequest {
    pub user_id: i64,
    pub habit_id: i64,
    /// 1 = done, 0 = skipped
    pub value: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OkResponse {
    #[serde(default)]
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FriendRequest {
    pub user_id: i64,
    pub target_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub user_id: i64,
    pub content: String,
    pub visibility: Visibility,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub user_id: i64,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeRequest {
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    #[serde(alias = "like_count", alias = "count")]
    pub likes: i64,
}
