//! Serialized event intake.
//!
//! Host callbacks can fire from several threads (network handlers, command
//! executors). Instead of mutating the engine directly they enqueue a
//! [`SyncEvent`] through an [`IntakeSender`]; the tick thread drains the queue
//! in arrival order.
//!
//! ```rust,ignore
//! let intake = engine.intake();
//! std::thread::spawn(move || {
//!     intake.send(SyncEvent::LocalInventoryChanged(player));
//! });
//!
//! // On the tick thread
//! engine.on_periodic_tick();
//! ```

use soullink_protocol::ClientId;
use std::sync::mpsc::{self, Receiver, Sender};

/// A host event routed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// A client connected.
    ClientJoined(ClientId),
    /// A client disconnected.
    ClientLeft(ClientId),
    /// A client opened a secondary container.
    ContainerOpened(ClientId),
    /// A client closed a secondary container.
    ContainerClosed(ClientId),
    /// A client's own inventory changed (pickup, drop, craft).
    LocalInventoryChanged(ClientId),
    /// A client respawned.
    ClientRespawned(ClientId),
    /// Administrative: apply canonical state to everyone.
    SyncAll,
    /// Administrative: empty the shared inventory.
    ResetAll,
    /// Administrative: make one client's inventory canonical.
    CopyFrom(ClientId),
}

impl SyncEvent {
    /// Returns the client the event concerns, if any.
    pub fn client(&self) -> Option<ClientId> {
        match *self {
            SyncEvent::ClientJoined(id)
            | SyncEvent::ClientLeft(id)
            | SyncEvent::ContainerOpened(id)
            | SyncEvent::ContainerClosed(id)
            | SyncEvent::LocalInventoryChanged(id)
            | SyncEvent::ClientRespawned(id)
            | SyncEvent::CopyFrom(id) => Some(id),
            SyncEvent::SyncAll | SyncEvent::ResetAll => None,
        }
    }
}

/// A cloneable handle for enqueuing events from any thread.
#[derive(Debug, Clone)]
pub struct IntakeSender {
    tx: Sender<SyncEvent>,
}

impl IntakeSender {
    /// Enqueues an event. Returns false if the engine has been dropped.
    pub fn send(&self, event: SyncEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Creates a connected sender/receiver pair.
pub(crate) fn channel() -> (IntakeSender, Receiver<SyncEvent>) {
    let (tx, rx) = mpsc::channel();
    (IntakeSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let (sender, rx) = channel();
        let a = ClientId::new();
        assert!(sender.send(SyncEvent::ClientJoined(a)));
        assert!(sender.send(SyncEvent::SyncAll));

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received, vec![SyncEvent::ClientJoined(a), SyncEvent::SyncAll]);
    }

    #[test]
    fn cloned_senders_share_the_queue() {
        let (sender, rx) = channel();
        let other = sender.clone();
        let a = ClientId::new();

        let handle = std::thread::spawn(move || other.send(SyncEvent::ContainerOpened(a)));
        assert!(handle.join().unwrap());
        assert!(sender.send(SyncEvent::ContainerClosed(a)));

        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn send_fails_after_receiver_dropped() {
        let (sender, rx) = channel();
        drop(rx);
        assert!(!sender.send(SyncEvent::ResetAll));
    }

    #[test]
    fn client_of_event() {
        let a = ClientId::new();
        assert_eq!(SyncEvent::CopyFrom(a).client(), Some(a));
        assert_eq!(SyncEvent::ResetAll.client(), None);
    }
}
