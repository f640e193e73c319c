//! Per-client change detection against the last synced snapshot.

use parking_lot::RwLock;
use soullink_protocol::{ClientId, Slots};
use std::collections::HashMap;

/// Remembers what each client's inventory looked like at its last capture
/// or apply, so unchanged inventories are not synced again.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    snapshots: RwLock<HashMap<ClientId, Slots>>,
}

impl ChangeDetector {
    /// Creates an empty detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `current` differs from the client's snapshot.
    ///
    /// A client without a snapshot has always changed.
    pub fn has_changed(&self, client: ClientId, current: &Slots) -> bool {
        match self.snapshots.read().get(&client) {
            Some(snapshot) => snapshot.first_difference(current).is_some(),
            None => true,
        }
    }

    /// Stores a copy of `slots` as the client's snapshot.
    pub fn update_snapshot(&self, client: ClientId, slots: &Slots) {
        self.snapshots.write().insert(client, slots.clone());
    }

    /// Returns true if the client has been captured or applied to since it
    /// joined or since the last reset.
    pub fn has_snapshot(&self, client: ClientId) -> bool {
        self.snapshots.read().contains_key(&client)
    }

    /// Returns a copy of the client's snapshot.
    pub fn snapshot(&self, client: ClientId) -> Option<Slots> {
        self.snapshots.read().get(&client).cloned()
    }

    /// Drops the client's snapshot.
    pub fn forget(&self, client: ClientId) {
        self.snapshots.write().remove(&client);
    }

    /// Drops every snapshot.
    pub fn clear(&self) {
        self.snapshots.write().clear();
    }
}
