//! # SoulLink Sync Engine
//!
//! Keeps every connected player's inventory identical to one canonical copy.
//!
//! This crate provides:
//! - Transaction guard (busy clients are never read from or written to)
//! - Per-client debouncing of sync triggers
//! - Change detection against the last synced snapshot
//! - Global versioning with per-client staleness
//! - Lazy load and periodic save of the canonical inventory
//! - A serialized event intake for multi-threaded hosts
//! - Linked health, hunger, knockback and death
//!
//! ## Architecture
//!
//! Every sync is either a **capture** (a client's live inventory becomes
//! canonical) or an **apply** (the canonical inventory is written into a
//! client). A capture is followed by a propagate, which applies to every
//! other client.
//!
//! Captures pass three gates in order: the transaction guard, the debouncer
//! and the change detector. Only then is the global version bumped.
//!
//! ## Key Invariants
//!
//! - Exactly 41 slots, always
//! - One version bump per accepted capture
//! - No capture or apply while a client is busy
//! - An apply never runs for a client that already holds the current version
//! - Every hand-out of the canonical state is a copy

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod debounce;
mod detector;
mod engine;
mod error;
mod guard;
mod host;
mod intake;
mod persistence;
mod version;
mod vitals;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LinkConfig, SyncConfig, DEFAULT_RECORD_NAME};
pub use debounce::Debouncer;
pub use detector::ChangeDetector;
pub use engine::{
    ApplyOutcome, CaptureOutcome, ClientRecord, JoinOutcome, SkipReason, SyncEngine, SyncStats,
};
pub use error::{ConfigError, SyncError, SyncResult};
pub use guard::{BusySet, BusyToken, TransactionGuard};
pub use host::{Broadcaster, InventoryHost, MemoryHost, NoopBroadcaster, RecordingBroadcaster};
pub use intake::{IntakeSender, SyncEvent};
pub use persistence::PersistenceAdapter;
pub use version::VersionTracker;
pub use vitals::{
    Knockback, MemoryVitalsHost, VitalsHost, VitalsLink, VitalsState, DAMAGE_COOLDOWN, MAX_FOOD,
};
