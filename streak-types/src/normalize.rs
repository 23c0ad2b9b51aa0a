//! Adapters from loosely-shaped backend payloads to strict records.
//!
//! The friend, recommendation, search and ranking endpoints do not agree on
//! field names. Every alias is listed here once:
//!
//! | field      | accepted keys                              |
//! |------------|--------------------------------------------|
//! | id         | `id`, `user_id`, `uid`, `candidate`        |
//! | username   | `username`, `user_name`, `handle`, `name`  |
//! | bio        | `bio`, `about`, `description`              |
//! | done days  | `done_days`, `days`, `score`               |
//!
//! `candidate` may hold either the id itself or a nested user object.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

const ID_KEYS: &[&str] = &["id", "user_id", "uid", "candidate"];
const USERNAME_KEYS: &[&str] = &["username", "user_name", "handle", "name"];
const BIO_KEYS: &[&str] = &["bio", "about", "description"];
const DONE_DAYS_KEYS: &[&str] = &["done_days", "days", "score"];

/// A user shown as a friend, recommendation or search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub username: String,
    pub bio: String,
}

impl Candidate {
    /// Returns `None` for entries that carry no usable id or username.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let nested = obj.get("candidate").and_then(Value::as_object);

        let id = find_id(obj).or_else(|| nested.and_then(find_id))?;
        let username = find_str(obj, USERNAME_KEYS)
            .or_else(|| nested.and_then(|n| find_str(n, USERNAME_KEYS)))?;
        let bio = find_str(obj, BIO_KEYS)
            .or_else(|| nested.and_then(|n| find_str(n, BIO_KEYS)))
            .unwrap_or_default();

        Some(Self { id, username, bio })
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey::Id(self.id)
    }
}

/// One row of the public ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub user_id: Option<i64>,
    pub username: String,
    pub done_days: i64,
}

impl RankEntry {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let user_id = find_id(obj);
        let username = find_str(obj, USERNAME_KEYS).unwrap_or_default();
        if user_id.is_none() && username.is_empty() {
            return None;
        }
        let done_days = DONE_DAYS_KEYS
            .iter()
            .find_map(|key| obj.get(*key).and_then(as_i64))
            .unwrap_or(0);

        Some(Self {
            user_id,
            username,
            done_days,
        })
    }

    pub fn identity(&self) -> IdentityKey {
        match self.user_id {
            Some(id) => IdentityKey::Id(id),
            None => IdentityKey::Name(self.username.to_lowercase()),
        }
    }
}

/// Best-available identity of a user record: the numeric id when known,
/// otherwise the lower-cased username.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Id(i64),
    Name(String),
}

/// Keeps the first occurrence of every identity, preserving order.
pub fn dedup_by_identity<T, F>(items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> IdentityKey,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Normalizes a list of untyped user payloads, dropping unusable and duplicate entries.
pub fn normalize_candidates(values: &[Value]) -> Vec<Candidate> {
    let candidates = values.iter().filter_map(Candidate::from_value).collect();
    dedup_by_identity(candidates, Candidate::identity)
}

/// Normalizes ranking rows, de-duplicates them and keeps at most `limit`.
pub fn normalize_ranking(values: &[Value], limit: usize) -> Vec<RankEntry> {
    let entries = values.iter().filter_map(RankEntry::from_value).collect();
    let mut entries = dedup_by_identity(entries, RankEntry::identity);
    entries.truncate(limit);
    entries
}

/// Public profile of another user, flattened from `{user, profile}` or flat payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicUserView {
    pub id: Option<i64>,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: String,
    pub is_public: bool,
    pub done_days: Option<i64>,
}

impl PublicUserView {
    pub fn from_value(value: &Value) -> Option<Self> {
        let root = value.as_object()?;
        let user = root.get("user").and_then(Value::as_object).unwrap_or(root);
        let profile = root.get("profile").and_then(Value::as_object).unwrap_or(root);

        let username = find_str(user, USERNAME_KEYS)?;
        let lookup = |keys: &[&str]| find_str(profile, keys).or_else(|| find_str(user, keys));

        Some(Self {
            id: find_id(user),
            username,
            first_name: lookup(&["first_name"]),
            last_name: lookup(&["last_name"]),
            bio: lookup(BIO_KEYS).unwrap_or_default(),
            is_public: profile
                .get("is_public")
                .or_else(|| user.get("is_public"))
                .map(truthy)
                .unwrap_or(true),
            done_days: DONE_DAYS_KEYS
                .iter()
                .find_map(|key| root.get(*key).and_then(as_i64)),
        })
    }
}

fn find_id(obj: &Map<String, Value>) -> Option<i64> {
    ID_KEYS.iter().find_map(|key| obj.get(*key).and_then(as_i64))
}

fn find_str(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts `true`/`false`, `0`/`1` and `"0"`/`"1"` for an optional flag.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_null()).map(|v| truthy(&v)))
}

/// Like [`lenient_bool`] but a missing value is `false`.
pub fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_bool(deserializer)?.unwrap_or(false))
}

// MySQL booleans arrive as 0/1.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    }
}
