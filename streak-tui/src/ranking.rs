use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, ApiResult};
use streak_types::{RankEntry, RankWindow};

/// Public top-N ranking for a selectable window.
///
/// Starting a fetch cancels the previous one. Results carry the sequence
/// number they were issued with and anything older than the latest request
/// is dropped, even when it finished before the cancellation landed.
#[derive(Debug, Default)]
pub struct RankingPanel {
    pub window: RankWindow,
    pub entries: Vec<RankEntry>,
    pub loading: bool,
    seq: u64,
    in_flight: Option<CancellationToken>,
}

impl RankingPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new fetch for the current window and returns its
    /// sequence number and cancellation token.
    pub fn begin(&mut self) -> (u64, CancellationToken) {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        self.seq += 1;
        self.loading = true;
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        (self.seq, token)
    }

    /// Applies a finished fetch. Returns the error message to surface, if any;
    /// stale and cancelled results are swallowed.
    pub fn finish(&mut self, seq: u64, result: ApiResult<Vec<RankEntry>>) -> Option<String> {
        if seq != self.seq {
            log::debug!("Dropping stale ranking result #{} (latest #{})", seq, self.seq);
            return None;
        }
        self.loading = false;
        self.in_flight = None;

        match result {
            // Already de-duplicated and capped by `normalize_ranking`
            Ok(entries) => {
                self.entries = entries;
                None
            }
            Err(ApiError::Cancelled) => None,
            Err(e) => Some(e.to_string()),
        }
    }

    /// Cycles 7 → 30 → 90 days.
    pub fn cycle_window(&mut self) -> RankWindow {
        self.window = self.window.next();
        self.window
    }

    pub fn latest_seq(&self) -> u64 {
        self.seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: Option<i64>, name: &str, days: i64) -> RankEntry {
        RankEntry {
            user_id: id,
            username: name.to_string(),
            done_days: days,
        }
    }

    #[test]
    fn test_new_fetch_cancels_previous() {
        let mut panel = RankingPanel::new();
        let (first, first_token) = panel.begin();
        let (second, second_token) = panel.begin();

        assert!(first_token.is_cancelled());
        assert!(!second_token.is_cancelled());
        assert!(second > first);
    }

    #[test]
    fn test_stale_result_is_ignored() {
        let mut panel = RankingPanel::new();
        let (old, _) = panel.begin();
        let (latest, _) = panel.begin();

        assert_eq!(panel.finish(old, Ok(vec![entry(Some(1), "old", 3)])), None);
        assert!(panel.entries.is_empty());
        assert!(panel.loading);

        panel.finish(latest, Ok(vec![entry(Some(2), "new", 5)]));
        assert_eq!(panel.entries[0].username, "new");
        assert!(!panel.loading);
    }

    #[test]
    fn test_cancellation_is_silent() {
        let mut panel = RankingPanel::new();
        let (seq, _) = panel.begin();
        assert_eq!(panel.finish(seq, Err(ApiError::Cancelled)), None);
    }

    #[test]
    fn test_error_is_reported() {
        let mut panel = RankingPanel::new();
        let (seq, _) = panel.begin();
        let message = panel.finish(seq, Err(ApiError::Api("boom".to_string())));
        assert_eq!(message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_new_result_replaces_entries() {
        let mut panel = RankingPanel::new();
        let (seq, _) = panel.begin();
        panel.finish(seq, Ok(vec![entry(Some(1), "ana", 9), entry(Some(2), "bo", 4)]));

        let (seq, _) = panel.begin();
        panel.finish(seq, Ok(vec![entry(Some(3), "cy", 2)]));
        assert_eq!(panel.entries.len(), 1);
        assert_eq!(panel.entries[0].username, "cy");
    }

    #[test]
    fn test_window_cycle() {
        let mut panel = RankingPanel::new();
        assert_eq!(panel.window.days(), 7);
        assert_eq!(panel.cycle_window().days(), 30);
        assert_eq!(panel.cycle_window().days(), 90);
        assert_eq!(panel.cycle_window().days(), 7);
    }
}
