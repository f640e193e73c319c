//! Per-key rate limiting of sync triggers.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

/// Suppresses triggers arriving faster than a minimum interval per key.
///
/// Tick scans, pickup events and container-close events can all fire within
/// milliseconds for the same client; only the first inside each window is
/// accepted.
#[derive(Debug)]
pub struct Debouncer<K> {
    interval_millis: u64,
    last_accepted: Mutex<HashMap<K, u64>>,
}

impl<K: Eq + Hash + Copy> Debouncer<K> {
    /// Creates a debouncer with the given minimum interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_millis: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the minimum interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_millis)
    }

    /// Accepts the trigger and records `now_millis` if the interval has
    /// elapsed since the last accepted trigger for `key`.
    ///
    /// A rejected trigger leaves the recorded time untouched. A clock that
    /// reads earlier than the last accepted time counts as no time elapsed.
    pub fn try_acquire(&self, key: K, now_millis: u64) -> bool {
        let mut last_accepted = self.last_accepted.lock();
        if let Some(&last) = last_accepted.get(&key) {
            if now_millis.saturating_sub(last) < self.interval_millis {
                return false;
            }
        }
        last_accepted.insert(key, now_millis);
        true
    }

    /// Records `now_millis` for `key` unconditionally.
    pub fn record(&self, key: K, now_millis: u64) {
        self.last_accepted.lock().insert(key, now_millis);
    }

    /// Returns the last accepted time for `key`.
    pub fn last_accepted(&self, key: &K) -> Option<u64> {
        self.last_accepted.lock().get(key).copied()
    }

    /// Drops the history for `key`.
    pub fn forget(&self, key: &K) {
        self.last_accepted.lock().remove(key);
    }

    /// Drops all history.
    pub fn clear(&self) {
        self.last_accepted.lock().clear();
    }
}
