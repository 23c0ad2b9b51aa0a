//! Transient notifications stacked in a corner of the screen.

use std::time::{Duration, Instant};

/// How long a toast stays before dismissing itself
pub const TOAST_LIFETIME: Duration = Duration::from_millis(3500);
/// Length of the exit transition once a toast is dismissed
pub const TOAST_EXIT: Duration = Duration::from_millis(160);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub title: Option<String>,
    pub message: String,
    created_at: Instant,
    /// Set once dismissed; the toast is dropped after [`TOAST_EXIT`]
    leaving_since: Option<Instant>,
}

impl Toast {
    pub fn is_leaving(&self) -> bool {
        self.leaving_since.is_some()
    }
}

/// Unbounded toast stack, oldest first.
#[derive(Debug, Default)]
pub struct ToastStack {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind, title: Option<&str>) -> u64 {
        self.notify_at(message, kind, title, Instant::now())
    }

    pub fn notify_at(
        &mut self,
        message: impl Into<String>,
        kind: ToastKind,
        title: Option<&str>,
        now: Instant,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.toasts.push(Toast {
            id,
            kind,
            title: title.map(str::to_string),
            message: message.into(),
            created_at: now,
            leaving_since: None,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, ToastKind::Success, None)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, ToastKind::Error, None)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, ToastKind::Info, None)
    }

    /// Manual close. Starts the exit transition; unknown ids are ignored.
    pub fn dismiss(&mut self, id: u64) {
        self.dismiss_at(id, Instant::now());
    }

    pub fn dismiss_at(&mut self, id: u64, now: Instant) {
        if let Some(toast) = self.toasts.iter_mut().find(|t| t.id == id) {
            toast.leaving_since.get_or_insert(now);
        }
    }

    /// Closes the newest toast that is not already leaving.
    pub fn dismiss_latest(&mut self) {
        let latest = self.toasts.iter().rev().find(|t| !t.is_leaving()).map(|t| t.id);
        if let Some(id) = latest {
            self.dismiss(id);
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Starts the exit of expired toasts and drops those whose exit finished.
    pub fn tick_at(&mut self, now: Instant) {
        for toast in &mut self.toasts {
            if toast.leaving_since.is_none() && now.duration_since(toast.created_at) >= TOAST_LIFETIME {
                toast.leaving_since = Some(now);
            }
        }
        self.toasts.retain(|t| match t.leaving_since {
            Some(since) => now.duration_since(since) < TOAST_EXIT,
            None => true,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Most recent message, mostly useful in tests.
    pub fn last_message(&self) -> Option<&str> {
        self.toasts.last().map(|t| t.message.as_str())
    }
}
