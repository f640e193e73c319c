//! Host collaborator traits and in-memory doubles.
//!
//! The engine never touches a game directly. It reads and writes live
//! inventories through [`InventoryHost`] and announces new state through
//! [`Broadcaster`]. [`MemoryHost`] and [`RecordingBroadcaster`] implement both
//! in memory for tests and tooling.

use parking_lot::RwLock;
use soullink_protocol::{ClientId, SlotState, Slots};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Access to the live inventories of connected clients.
pub trait InventoryHost: Send + Sync {
    /// Returns a copy of the client's live slots, or `None` if the client is
    /// not present on the host.
    fn read_live_slots(&self, client: ClientId) -> Option<Slots>;

    /// Overwrites the client's live slots. Absent clients are ignored.
    fn write_live_slots(&self, client: ClientId, slots: &Slots);

    /// Returns true if the client currently holds an item on its cursor.
    fn is_cursor_held(&self, client: ClientId) -> bool;
}

/// Fire-and-forget notification of a client's new inventory state.
pub trait Broadcaster: Send + Sync {
    /// Sends `state` to `client`.
    fn broadcast(&self, client: ClientId, state: &SlotState);
}

/// A broadcaster that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
    fn broadcast(&self, _client: ClientId, _state: &SlotState) {}
}

#[derive(Debug, Default)]
struct LiveClient {
    slots: Slots,
    cursor_held: bool,
}

/// An in-memory [`InventoryHost`].
#[derive(Debug, Default)]
pub struct MemoryHost {
    clients: RwLock<HashMap<ClientId, LiveClient>>,
    writes: AtomicU64,
}

impl MemoryHost {
    /// Creates a host with no clients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a client with a fresh id and returns it.
    pub fn connect(&self, slots: Slots) -> ClientId {
        let client = ClientId::new();
        self.connect_as(client, slots);
        client
    }

    /// Adds (or replaces) a client under a known id.
    pub fn connect_as(&self, client: ClientId, slots: Slots) {
        self.clients.write().insert(
            client,
            LiveClient {
                slots,
                cursor_held: false,
            },
        );
    }

    /// Removes a client.
    pub fn disconnect(&self, client: ClientId) {
        self.clients.write().remove(&client);
    }

    /// Replaces a client's live slots as if the player edited them.
    pub fn set_live(&self, client: ClientId, slots: Slots) {
        if let Some(live) = self.clients.write().get_mut(&client) {
            live.slots = slots;
        }
    }

    /// Returns a copy of a client's live slots.
    pub fn live(&self, client: ClientId) -> Option<Slots> {
        self.clients.read().get(&client).map(|c| c.slots.clone())
    }

    /// Sets whether a client is holding an item on its cursor.
    pub fn set_cursor_held(&self, client: ClientId, held: bool) {
        if let Some(live) = self.clients.write().get_mut(&client) {
            live.cursor_held = held;
        }
    }

    /// Returns how many times the engine wrote live slots.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl InventoryHost for MemoryHost {
    fn read_live_slots(&self, client: ClientId) -> Option<Slots> {
        self.live(client)
    }

    fn write_live_slots(&self, client: ClientId, slots: &Slots) {
        if let Some(live) = self.clients.write().get_mut(&client) {
            live.slots = slots.clone();
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_cursor_held(&self, client: ClientId) -> bool {
        self.clients
            .read()
            .get(&client)
            .is_some_and(|c| c.cursor_held)
    }
}

/// A [`Broadcaster`] that keeps every message it was asked to send.
#[derive(Debug, Default)]
pub struct RecordingBroadcaster {
    sent: RwLock<Vec<(ClientId, SlotState)>>,
}

impl RecordingBroadcaster {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message sent so far, oldest first.
    pub fn sent(&self) -> Vec<(ClientId, SlotState)> {
        self.sent.read().clone()
    }

    /// Returns the versions broadcast to one client, oldest first.
    pub fn versions_for(&self, client: ClientId) -> Vec<u64> {
        self.sent
            .read()
            .iter()
            .filter(|(id, _)| *id == client)
            .map(|(_, state)| state.version)
            .collect()
    }

    /// Drops recorded messages.
    pub fn clear(&self) {
        self.sent.write().clear();
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn broadcast(&self, client: ClientId, state: &SlotState) {
        self.sent.write().push((client, state.clone()));
    }
}
