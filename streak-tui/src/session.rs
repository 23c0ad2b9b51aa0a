use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::storage::KeyValueStore;
use streak_types::{Profile, Theme, UserRef};

/// Storage key of the session blob
pub const SESSION_KEY: &str = "habits_session";
/// Storage key of the theme preference
pub const THEME_KEY: &str = "habits-theme";
/// Cached sessions older than this are discarded on load
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Signed-in user as restored from, or written to, the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: UserRef,
    pub profile: Option<Profile>,
}

/// On-disk shape: `{user, profile, t}` with `t` in epoch milliseconds.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    user: UserRef,
    profile: Option<Profile>,
    t: i64,
}

/// Caches the signed-in user and profile with a fixed time-to-live.
///
/// Expiry is only checked lazily in [`SessionCache::load`]; an expired or
/// unreadable blob is deleted and reported as absent, exactly like a session
/// that never existed.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn KeyValueStore>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrites the blob with `{user, profile, t: now}`.
    pub fn save(&self, user: &UserRef, profile: Option<&Profile>) -> Result<()> {
        self.save_at(user, profile, Utc::now().timestamp_millis())
    }

    pub fn save_at(&self, user: &UserRef, profile: Option<&Profile>, now_ms: i64) -> Result<()> {
        let blob = StoredSession {
            user: user.clone(),
            profile: profile.cloned(),
            t: now_ms,
        };
        let json = serde_json::to_string(&blob).context("Failed to serialize session")?;
        self.store.set(SESSION_KEY, &json)?;
        log::debug!("Saved session for user {}", user.username);
        Ok(())
    }

    pub fn load(&self) -> Option<Session> {
        self.load_at(Utc::now().timestamp_millis())
    }

    pub fn load_at(&self, now_ms: i64) -> Option<Session> {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read session: {:#}", e);
                return None;
            }
        };

        let blob: StoredSession = match serde_json::from_str(&raw) {
            Ok(blob) => blob,
            Err(e) => {
                log::warn!("Discarding unreadable session: {}", e);
                self.discard();
                return None;
            }
        };

        let ttl_ms = SESSION_TTL.as_millis() as i64;
        // An age that does not fit in i64 comes from a garbage timestamp
        let expired = now_ms.checked_sub(blob.t).map_or(true, |age| age > ttl_ms);
        if expired {
            log::info!("Discarding expired session of {}", blob.user.username);
            self.discard();
            return None;
        }

        Some(Session {
            user: blob.user,
            profile: blob.profile,
        })
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(SESSION_KEY)
    }

    fn discard(&self) {
        if let Err(e) = self.store.remove(SESSION_KEY) {
            log::warn!("Failed to delete session: {:#}", e);
        }
    }
}

/// UI preferences that outlive a session.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Saved theme; unknown or missing values fall back to light.
    pub fn theme(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            Ok(Some(value)) => Theme::parse(value.trim()).unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                log::warn!("Failed to read theme preference: {:#}", e);
                Theme::default()
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())
    }
}
