//! Busy sets and the transaction guard.
//!
//! A [`BusySet`] is the loop-prevention primitive shared by every fan-out
//! feature: an id in the set is mid-operation and must not be read from or
//! written to. [`TransactionGuard`] combines an explicit busy set (secondary
//! container open) with a live cursor check.

use crate::host::InventoryHost;
use parking_lot::RwLock;
use soullink_protocol::ClientId;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

/// A concurrent set of identifiers currently being processed.
#[derive(Debug)]
pub struct BusySet<K> {
    members: RwLock<HashSet<K>>,
}

impl<K: Eq + Hash + Copy> BusySet<K> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            members: RwLock::new(HashSet::new()),
        }
    }

    /// Adds an id. Returns false if it was already present.
    pub fn insert(&self, id: K) -> bool {
        self.members.write().insert(id)
    }

    /// Removes an id. Returns false if it was absent.
    pub fn remove(&self, id: &K) -> bool {
        self.members.write().remove(id)
    }

    /// Returns true if the id is present.
    pub fn contains(&self, id: &K) -> bool {
        self.members.read().contains(id)
    }

    /// Adds an id for the lifetime of the returned token.
    ///
    /// Returns `None` if the id is already busy, which is how re-entrant
    /// callbacks detect that they are running inside their own fan-out.
    pub fn try_enter(&self, id: K) -> Option<BusyToken<'_, K>> {
        if self.insert(id) {
            Some(BusyToken { set: self, id })
        } else {
            None
        }
    }

    /// Removes every id.
    pub fn clear(&self) {
        self.members.write().clear();
    }

    /// Returns the number of busy ids.
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Returns true if nothing is busy.
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}

impl<K: Eq + Hash + Copy> Default for BusySet<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Membership in a [`BusySet`], released on drop.
#[derive(Debug)]
#[must_use = "the id is released as soon as the token is dropped"]
pub struct BusyToken<'a, K: Eq + Hash + Copy> {
    set: &'a BusySet<K>,
    id: K,
}

impl<K: Eq + Hash + Copy> BusyToken<'_, K> {
    /// Returns the id this token holds.
    pub fn id(&self) -> K {
        self.id
    }
}

impl<K: Eq + Hash + Copy> Drop for BusyToken<'_, K> {
    fn drop(&mut self) {
        self.set.remove(&self.id);
    }
}

/// Tracks which clients are mid-transaction.
///
/// A client is busy while explicitly marked (a secondary container is open)
/// or while it holds an item on its cursor. The cursor is read live from the
/// host on every check and never cached.
pub struct TransactionGuard<H> {
    marked: BusySet<ClientId>,
    host: Arc<H>,
}

impl<H: InventoryHost> TransactionGuard<H> {
    /// Creates a guard probing cursors through `host`.
    pub fn new(host: Arc<H>) -> Self {
        Self {
            marked: BusySet::new(),
            host,
        }
    }

    /// Marks a client busy (container opened).
    pub fn mark_busy(&self, client: ClientId) {
        self.marked.insert(client);
    }

    /// Clears the explicit busy mark (container closed).
    pub fn mark_free(&self, client: ClientId) {
        self.marked.remove(&client);
    }

    /// Returns true if the client is explicitly marked busy.
    pub fn is_marked(&self, client: ClientId) -> bool {
        self.marked.contains(&client)
    }

    /// Returns true if the client is holding an item on its cursor.
    pub fn is_cursor_held(&self, client: ClientId) -> bool {
        self.host.is_cursor_held(client)
    }

    /// Returns true if the client must not be captured from or applied to.
    pub fn is_busy(&self, client: ClientId) -> bool {
        self.is_marked(client) || self.is_cursor_held(client)
    }
}
