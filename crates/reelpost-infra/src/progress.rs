//! Upload progress keyed by generated upload tokens.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct ProgressEntry {
    percent: u8,
    touched_at: Instant,
}

/// Concurrency-safe map from upload token to percentage (0-100).
///
/// Entries untouched for longer than the TTL read as unknown and are dropped by
/// [`ProgressTracker::cleanup_expired`]. Updates come from the synchronous progress
/// callback, hence the std lock.
#[derive(Debug)]
pub struct ProgressTracker {
    entries: RwLock<HashMap<String, ProgressEntry>>,
    ttl: Duration,
}

impl ProgressTracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, ProgressEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, ProgressEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn is_fresh(&self, entry: &ProgressEntry, now: Instant) -> bool {
        now.duration_since(entry.touched_at) < self.ttl
    }

    /// Create a new token with progress 0.
    pub fn issue(&self) -> String {
        let token = Uuid::new_v4().to_string();
        self.start(&token);
        token
    }

    /// (Re)start tracking `token` at 0.
    pub fn start(&self, token: &str) {
        self.write().insert(
            token.to_string(),
            ProgressEntry {
                percent: 0,
                touched_at: Instant::now(),
            },
        );
    }

    /// True when `token` is tracked and not expired.
    pub fn is_live(&self, token: &str) -> bool {
        self.get(token).is_some()
    }

    /// Record progress; values above 100 are clamped. Unknown tokens are ignored.
    pub fn update(&self, token: &str, percent: u8) {
        let mut entries = self.write();
        if let Some(entry) = entries.get_mut(token) {
            entry.percent = percent.min(100);
            entry.touched_at = Instant::now();
        }
    }

    pub fn get(&self, token: &str) -> Option<u8> {
        let now = Instant::now();
        self.read()
            .get(token)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.percent)
    }

    /// Stop tracking `token`; later reads report it as unknown.
    pub fn finish(&self, token: &str) {
        self.write().remove(token);
    }

    /// Drop expired entries and return how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.touched_at) < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Periodically purge expired progress entries.
pub fn spawn_progress_cleanup(tracker: Arc<ProgressTracker>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = tracker.cleanup_expired();
            if removed > 0 {
                tracing::debug!(removed, "Expired upload progress entries removed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_token_has_no_progress() {
        let tracker = ProgressTracker::new(Duration::from_secs(60));
        assert_eq!(tracker.get("nope"), None);
        assert!(!tracker.is_live("nope"));
    }

    #[test]
    fn test_issue_update_finish() {
        let tracker = ProgressTracker::new(Duration::from_secs(60));
        let token = tracker.issue();
        assert!(Uuid::parse_str(&token).is_ok());
        assert_eq!(tracker.get(&token), Some(0));

        tracker.update(&token, 40);
        assert_eq!(tracker.get(&token), Some(40));
        tracker.update(&token, 250);
        assert_eq!(tracker.get(&token), Some(100));

        tracker.finish(&token);
        assert_eq!(tracker.get(&token), None);
    }

    #[test]
    fn test_tokens_are_independent() {
        let tracker = ProgressTracker::new(Duration::from_secs(60));
        let a = tracker.issue();
        let b = tracker.issue();
        assert_ne!(a, b);

        tracker.update(&a, 80);
        assert_eq!(tracker.get(&a), Some(80));
        assert_eq!(tracker.get(&b), Some(0));
    }

    #[test]
    fn test_update_does_not_resurrect_finished_token() {
        let tracker = ProgressTracker::new(Duration::from_secs(60));
        let token = tracker.issue();
        tracker.finish(&token);
        tracker.update(&token, 50);
        assert_eq!(tracker.get(&token), None);
    }

    #[test]
    fn test_entries_expire() {
        let tracker = ProgressTracker::new(Duration::from_millis(20));
        let token = tracker.issue();
        std::thread::sleep(Duration::from_millis(40));

        assert_eq!(tracker.get(&token), None);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.cleanup_expired(), 1);
        assert!(tracker.is_empty());
    }
}
