//! Durable storage of the canonical inventory.

use crate::error::SyncResult;
use soullink_protocol::SlotState;
use soullink_storage::RecordStore;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Saves and loads [`SlotState`] under one named record.
///
/// Dirtiness is a generation counter: every mutation bumps `generation`, and a
/// save only marks clean the generation it observed before taking its
/// snapshot. A mutation that lands during a save keeps the adapter dirty.
pub struct PersistenceAdapter<S> {
    store: Arc<S>,
    record_name: String,
    save_interval_ticks: u64,
    generation: AtomicU64,
    saved_generation: AtomicU64,
    retry_pending: AtomicBool,
}

impl<S: RecordStore> PersistenceAdapter<S> {
    /// Creates an adapter over `store`.
    pub fn new(store: Arc<S>, record_name: impl Into<String>, save_interval_ticks: u64) -> Self {
        Self {
            store,
            record_name: record_name.into(),
            save_interval_ticks: save_interval_ticks.max(1),
            generation: AtomicU64::new(0),
            saved_generation: AtomicU64::new(0),
            retry_pending: AtomicBool::new(false),
        }
    }

    /// Encodes a state into an opaque durable record.
    pub fn encode(state: &SlotState) -> SyncResult<Vec<u8>> {
        Ok(state.to_record_bytes()?)
    }

    /// Decodes a record produced by [`encode`](Self::encode).
    pub fn decode(bytes: &[u8]) -> SyncResult<SlotState> {
        Ok(SlotState::from_record_bytes(bytes)?)
    }

    /// Reads the stored state.
    ///
    /// Returns `Ok(None)` when no record exists.
    pub fn load(&self) -> SyncResult<Option<SlotState>> {
        match self.store.read(&self.record_name)? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Reads the stored state, falling back to the empty state when the
    /// record is missing, unreadable or corrupt.
    pub fn load_or_empty(&self) -> SlotState {
        match self.load() {
            Ok(Some(state)) => {
                info!(
                    "Loaded shared inventory v{} ({} occupied slots)",
                    state.version,
                    state.slots.occupied_count()
                );
                state
            }
            Ok(None) => {
                info!("No saved shared inventory, starting empty");
                SlotState::empty()
            }
            Err(e) => {
                warn!("Discarding unreadable shared inventory record: {}", e);
                SlotState::empty()
            }
        }
    }

    /// Writes a snapshot taken by `snapshot`.
    ///
    /// The dirty generation is read before the snapshot is taken. On failure
    /// the adapter stays dirty and schedules a retry for the next tick.
    pub fn save_with<F>(&self, snapshot: F) -> SyncResult<()>
    where
        F: FnOnce() -> SlotState,
    {
        let generation = self.generation.load(Ordering::SeqCst);
        let state = snapshot();
        let result = Self::encode(&state)
            .and_then(|bytes| Ok(self.store.write(&self.record_name, &bytes)?));

        match result {
            Ok(()) => {
                self.saved_generation.fetch_max(generation, Ordering::SeqCst);
                self.retry_pending.store(false, Ordering::SeqCst);
                Ok(())
            }
            Err(e) => {
                error!("Failed to save shared inventory v{}: {}", state.version, e);
                self.retry_pending.store(true, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Records that the canonical state changed.
    pub fn mark_dirty(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns true if there are changes not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.generation.load(Ordering::SeqCst) != self.saved_generation.load(Ordering::SeqCst)
    }

    /// Returns true if a periodic save should run on `tick`.
    ///
    /// Due while dirty on every `save_interval_ticks`-th tick, or on any tick
    /// following a failed save.
    pub fn is_due(&self, tick: u64) -> bool {
        if !self.is_dirty() {
            return false;
        }
        self.retry_pending.load(Ordering::SeqCst) || tick % self.save_interval_ticks == 0
    }

    /// Returns true if the last save failed.
    pub fn retry_pending(&self) -> bool {
        self.retry_pending.load(Ordering::SeqCst)
    }

    /// Returns the record name.
    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}
