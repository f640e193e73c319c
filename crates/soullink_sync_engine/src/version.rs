//! Global version counter and per-client applied versions.

use parking_lot::RwLock;
use soullink_protocol::ClientId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks the global capture version and which version each client has.
///
/// An apply can race with a newer capture; comparing the client's applied
/// version against the global one lets the engine skip clients that already
/// hold the current (or a newer) state.
#[derive(Debug, Default)]
pub struct VersionTracker {
    global: AtomicU64,
    applied: RwLock<HashMap<ClientId, u64>>,
}

impl VersionTracker {
    /// Creates a tracker at version 0 with no clients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the global version and returns the new value.
    pub fn next_version(&self) -> u64 {
        self.global.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns the global version.
    pub fn current(&self) -> u64 {
        self.global.load(Ordering::SeqCst)
    }

    /// Seeds the global version from a loaded record.
    pub fn restore(&self, version: u64) {
        self.global.store(version, Ordering::SeqCst);
    }

    /// Returns true if the client already has `version` or newer.
    ///
    /// A client with no recorded version is never current.
    pub fn is_current(&self, client: ClientId, version: u64) -> bool {
        self.applied
            .read()
            .get(&client)
            .is_some_and(|&applied| applied >= version)
    }

    /// Returns true if the client is behind `version`.
    pub fn is_stale(&self, client: ClientId, version: u64) -> bool {
        !self.is_current(client, version)
    }

    /// Records that the client now holds `version`. Never moves backwards.
    pub fn record_applied(&self, client: ClientId, version: u64) {
        let mut applied = self.applied.write();
        let entry = applied.entry(client).or_insert(version);
        *entry = (*entry).max(version);
    }

    /// Returns the client's applied version.
    pub fn last_applied(&self, client: ClientId) -> Option<u64> {
        self.applied.read().get(&client).copied()
    }

    /// Forgets what the client has, making it stale.
    pub fn invalidate(&self, client: ClientId) {
        self.applied.write().remove(&client);
    }

    /// Returns version 0 and forgets every client.
    pub fn reset(&self) {
        self.global.store(0, Ordering::SeqCst);
        self.applied.write().clear();
    }
}
