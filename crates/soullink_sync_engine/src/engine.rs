//! The shared inventory sync engine.

use crate::clock::{Clock, SystemClock};
use crate::config::{LinkConfig, SyncConfig};
use crate::debounce::Debouncer;
use crate::detector::ChangeDetector;
use crate::error::SyncResult;
use crate::guard::{BusySet, TransactionGuard};
use crate::host::{Broadcaster, InventoryHost};
use crate::intake::{self, IntakeSender, SyncEvent};
use crate::persistence::PersistenceAdapter;
use crate::version::VersionTracker;
use parking_lot::{Mutex, Once, RwLock};
use soullink_protocol::{ClientId, SlotState, Slots};
use soullink_storage::RecordStore;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tracing::{debug, info};

/// Why a capture or apply did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Inventory linking is turned off.
    Disabled,
    /// The client is not connected.
    UnknownClient,
    /// The client has a container open or an item on its cursor.
    Busy,
    /// An apply to this client is already running.
    InFlight,
    /// The client triggered a sync too recently.
    Debounced,
    /// The client's inventory matches its last snapshot.
    Unchanged,
    /// The client already holds the current version.
    Current,
    /// The client has not been synced since it joined or since a reset, so
    /// the shared inventory was applied to it instead of captured from it.
    Unsynced,
    /// Inventories are not kept on death.
    InventoryNotKept,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::Disabled => "inventory link disabled",
            SkipReason::UnknownClient => "client not connected",
            SkipReason::Busy => "client busy",
            SkipReason::InFlight => "apply in flight",
            SkipReason::Debounced => "debounced",
            SkipReason::Unchanged => "inventory unchanged",
            SkipReason::Current => "already current",
            SkipReason::Unsynced => "client not yet synced",
            SkipReason::InventoryNotKept => "inventory not kept on death",
        };
        f.write_str(reason)
    }
}

/// Result of a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The client's inventory became canonical.
    Captured {
        /// The new global version.
        version: u64,
        /// How many other clients received the new state.
        propagated: usize,
    },
    /// Nothing was captured.
    Skipped(SkipReason),
}

impl CaptureOutcome {
    /// Returns true if a capture happened.
    pub fn is_captured(&self) -> bool {
        matches!(self, CaptureOutcome::Captured { .. })
    }

    /// Returns the new version if a capture happened.
    pub fn version(&self) -> Option<u64> {
        match self {
            CaptureOutcome::Captured { version, .. } => Some(*version),
            CaptureOutcome::Skipped(_) => None,
        }
    }
}

/// Result of an apply attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Canonical state was written to the client.
    Applied {
        /// The version the client now holds.
        version: u64,
    },
    /// Nothing was written.
    Skipped(SkipReason),
}

impl ApplyOutcome {
    /// Returns true if an apply happened.
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// What happened when a client joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The joiner's inventory seeded the canonical state.
    Seeded(CaptureOutcome),
    /// The canonical state was mirrored onto the joiner.
    Mirrored(ApplyOutcome),
    /// Inventory linking is turned off.
    Skipped(SkipReason),
}

/// Counters describing engine activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Successful captures.
    pub captures: u64,
    /// Successful applies.
    pub applies: u64,
    /// Captures and applies that were skipped.
    pub skips: u64,
    /// Successful saves.
    pub saves: u64,
    /// Failed saves.
    pub save_failures: u64,
    /// Administrative resets.
    pub resets: u64,
    /// Periodic ticks processed.
    pub ticks: u64,
}

/// Read-only view of one client's sync bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRecord {
    /// The client.
    pub client: ClientId,
    /// Whether the client is busy right now.
    pub busy: bool,
    /// Time of the last accepted sync trigger.
    pub last_sync_at_millis: Option<u64>,
    /// Last version written to or captured from the client.
    pub last_applied_version: Option<u64>,
    /// Inventory as of the last capture or apply.
    pub last_known_snapshot: Option<Slots>,
}

/// Keeps every connected client's inventory identical to one canonical copy.
///
/// All entry points are driven from a single tick thread; other threads feed
/// events through [`intake`](Self::intake). Entry points never return errors:
/// skips are reported as [`SkipReason`]s and storage failures are logged and
/// retried.
///
/// # Example
///
/// ```rust
/// use soullink_protocol::{ItemStack, Slots};
/// use soullink_storage::InMemoryStore;
/// use soullink_sync_engine::{
///     LinkConfig, MemoryHost, RecordingBroadcaster, SyncConfig, SyncEngine,
/// };
/// use std::sync::Arc;
///
/// let host = Arc::new(MemoryHost::new());
/// let engine = SyncEngine::new(
///     SyncConfig::default(),
///     LinkConfig::default(),
///     Arc::clone(&host),
///     Arc::new(RecordingBroadcaster::new()),
///     Arc::new(InMemoryStore::new()),
/// )
/// .unwrap();
///
/// let sword = Slots::from_pairs([(0, ItemStack::new("minecraft:iron_sword", 1))]).unwrap();
/// let alice = host.connect(sword.clone());
/// let bob = host.connect(Slots::empty());
///
/// engine.on_client_joined(alice);
/// engine.on_client_joined(bob);
/// assert_eq!(host.live(bob), Some(sword));
/// ```
pub struct SyncEngine<H, B, S> {
    config: SyncConfig,
    link: LinkConfig,
    host: Arc<H>,
    broadcaster: Arc<B>,
    clock: Arc<dyn Clock>,
    guard: TransactionGuard<H>,
    debouncer: Debouncer<ClientId>,
    detector: ChangeDetector,
    versions: VersionTracker,
    persistence: PersistenceAdapter<S>,
    state: RwLock<SlotState>,
    loaded: Once,
    clients: RwLock<Vec<ClientId>>,
    applying: BusySet<ClientId>,
    pending_seeds: BusySet<ClientId>,
    close_delays: Mutex<HashMap<ClientId, u32>>,
    tick: AtomicU64,
    stats: RwLock<SyncStats>,
    intake_tx: IntakeSender,
    intake_rx: Mutex<Receiver<SyncEvent>>,
}

impl<H, B, S> SyncEngine<H, B, S>
where
    H: InventoryHost,
    B: Broadcaster,
    S: RecordStore,
{
    /// Creates an engine. Saved state is loaded lazily on first use.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SyncError::Config`] if either configuration is invalid.
    pub fn new(
        config: SyncConfig,
        link: LinkConfig,
        host: Arc<H>,
        broadcaster: Arc<B>,
        store: Arc<S>,
    ) -> SyncResult<Self> {
        config.validate()?;
        link.validate()?;

        let persistence = PersistenceAdapter::new(
            store,
            config.record_name.clone(),
            config.save_interval_ticks,
        );
        let (intake_tx, intake_rx) = intake::channel();

        Ok(Self {
            guard: TransactionGuard::new(Arc::clone(&host)),
            debouncer: Debouncer::new(config.debounce),
            detector: ChangeDetector::new(),
            versions: VersionTracker::new(),
            persistence,
            state: RwLock::new(SlotState::empty()),
            loaded: Once::new(),
            clients: RwLock::new(Vec::new()),
            applying: BusySet::new(),
            pending_seeds: BusySet::new(),
            close_delays: Mutex::new(HashMap::new()),
            tick: AtomicU64::new(0),
            stats: RwLock::new(SyncStats::default()),
            intake_tx,
            intake_rx: Mutex::new(intake_rx),
            clock: Arc::new(SystemClock::new()),
            config,
            link,
            host,
            broadcaster,
        })
    }

    /// Replaces the time source used for debouncing.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn ensure_loaded(&self) {
        self.loaded.call_once(|| {
            let loaded = self.persistence.load_or_empty();
            self.versions.restore(loaded.version);
            *self.state.write() = loaded;
        });
    }

    fn enabled(&self) -> bool {
        self.link.link_inventory
    }

    fn is_connected(&self, client: ClientId) -> bool {
        self.clients.read().contains(&client)
    }

    fn update_stats(&self, f: impl FnOnce(&mut SyncStats)) {
        f(&mut self.stats.write());
    }

    fn skip_capture(&self, client: ClientId, reason: SkipReason) -> CaptureOutcome {
        debug!("Skipping capture from {}: {}", client, reason);
        self.update_stats(|s| s.skips += 1);
        CaptureOutcome::Skipped(reason)
    }

    fn skip_apply(&self, client: ClientId, reason: SkipReason) -> ApplyOutcome {
        debug!("Skipping apply to {}: {}", client, reason);
        self.update_stats(|s| s.skips += 1);
        ApplyOutcome::Skipped(reason)
    }

    // ---- Core operations ----

    /// Makes the client's live inventory canonical and propagates it.
    ///
    /// Gates run in order: busy guard, debounce, change detection. Only a
    /// capture that passes all three bumps the version.
    ///
    /// A client that has not been synced since it joined or since a reset
    /// holds an inventory that was never shared. Unless it is seeding, it is
    /// brought up to date instead and the capture reports
    /// [`SkipReason::Unsynced`].
    pub fn capture(&self, client: ClientId) -> CaptureOutcome {
        self.ensure_loaded();
        if !self.enabled() {
            return CaptureOutcome::Skipped(SkipReason::Disabled);
        }
        if !self.is_connected(client) {
            return self.skip_capture(client, SkipReason::UnknownClient);
        }
        if self.applying.contains(&client) {
            return self.skip_capture(client, SkipReason::InFlight);
        }
        if self.guard.is_busy(client) {
            return self.skip_capture(client, SkipReason::Busy);
        }
        if self.needs_mirror(client) {
            self.apply_to(client);
            return self.skip_capture(client, SkipReason::Unsynced);
        }
        if !self
            .debouncer
            .try_acquire(client, self.clock.now_millis())
        {
            return self.skip_capture(client, SkipReason::Debounced);
        }
        let Some(live) = self.host.read_live_slots(client) else {
            return self.skip_capture(client, SkipReason::UnknownClient);
        };
        if !self.detector.has_changed(client, &live) {
            return self.skip_capture(client, SkipReason::Unchanged);
        }

        let version = self.commit(client, live);
        let propagated = self.propagate(client);
        CaptureOutcome::Captured {
            version,
            propagated,
        }
    }

    /// Returns true if the client has no snapshot and may not seed.
    ///
    /// A pending seed only stands while the joiner is alone or the canonical
    /// state is still empty.
    fn needs_mirror(&self, client: ClientId) -> bool {
        if self.detector.has_snapshot(client) {
            return false;
        }
        if self.pending_seeds.contains(&client) && self.may_seed() {
            return false;
        }
        self.pending_seeds.remove(&client);
        true
    }

    fn may_seed(&self) -> bool {
        self.clients.read().len() == 1 || self.state.read().is_empty()
    }

    /// Replaces the canonical state with `live` and returns the new version.
    fn commit(&self, client: ClientId, live: Slots) -> u64 {
        let version = {
            let mut state = self.state.write();
            let version = self.versions.next_version();
            *state = SlotState::new(live.clone(), version);
            version
        };
        self.detector.update_snapshot(client, &live);
        self.pending_seeds.remove(&client);
        self.versions.record_applied(client, version);
        self.persistence.mark_dirty();
        self.update_stats(|s| s.captures += 1);
        debug!(
            "Captured v{} from {} ({} occupied slots)",
            version,
            client,
            live.occupied_count()
        );
        version
    }

    /// Applies canonical state to every connected client except `except`.
    ///
    /// Returns how many clients were written.
    pub fn propagate(&self, except: ClientId) -> usize {
        self.fan_out(Some(except), false)
    }

    fn fan_out(&self, except: Option<ClientId>, force: bool) -> usize {
        let targets: Vec<ClientId> = self
            .clients
            .read()
            .iter()
            .copied()
            .filter(|id| Some(*id) != except)
            .collect();

        targets
            .into_iter()
            .filter(|&client| {
                if force {
                    self.versions.invalidate(client);
                }
                self.apply_to(client).is_applied()
            })
            .count()
    }

    /// Writes the canonical state into the client's live inventory.
    ///
    /// Skipped when the client is busy, already being applied to, or already
    /// holds the current version.
    pub fn apply_to(&self, client: ClientId) -> ApplyOutcome {
        self.ensure_loaded();
        if !self.enabled() {
            return ApplyOutcome::Skipped(SkipReason::Disabled);
        }
        if !self.is_connected(client) {
            return self.skip_apply(client, SkipReason::UnknownClient);
        }
        let Some(_in_flight) = self.applying.try_enter(client) else {
            return self.skip_apply(client, SkipReason::InFlight);
        };
        if self.guard.is_busy(client) {
            return self.skip_apply(client, SkipReason::Busy);
        }

        let state = self.canonical_state();
        if self.versions.is_current(client, state.version) {
            return self.skip_apply(client, SkipReason::Current);
        }

        self.host.write_live_slots(client, &state.slots);
        self.versions.record_applied(client, state.version);
        self.detector.update_snapshot(client, &state.slots);
        self.broadcaster.broadcast(client, &state);
        self.update_stats(|s| s.applies += 1);
        debug!("Applied v{} to {}", state.version, client);

        ApplyOutcome::Applied {
            version: state.version,
        }
    }

    /// Captures from the client if its inventory moved since the last sync,
    /// otherwise brings it up to date if it fell behind.
    fn attempt_sync(&self, client: ClientId) {
        if self.applying.contains(&client) || self.guard.is_busy(client) {
            return;
        }
        let Some(live) = self.host.read_live_slots(client) else {
            return;
        };
        if self.detector.has_changed(client, &live) {
            self.capture(client);
        } else if self.versions.is_stale(client, self.versions.current()) {
            self.apply_to(client);
        }
    }

    // ---- Host events ----

    /// Registers a client and either seeds or mirrors the canonical state.
    ///
    /// The joiner seeds the state if nobody else is connected or the state is
    /// entirely empty; otherwise the state is applied to it. A busy joiner
    /// seeds or mirrors once it is free.
    pub fn on_client_joined(&self, client: ClientId) -> JoinOutcome {
        self.ensure_loaded();
        if !self.enabled() {
            return JoinOutcome::Skipped(SkipReason::Disabled);
        }

        let alone = {
            let mut clients = self.clients.write();
            if !clients.contains(&client) {
                clients.push(client);
            }
            clients.len() == 1
        };

        if alone || self.state.read().is_empty() {
            self.pending_seeds.insert(client);
            let outcome = self.capture(client);
            info!("{} joined, seeding shared inventory: {:?}", client, outcome);
            JoinOutcome::Seeded(outcome)
        } else {
            let outcome = self.apply_to(client);
            info!("{} joined, mirroring shared inventory: {:?}", client, outcome);
            JoinOutcome::Mirrored(outcome)
        }
    }

    /// Drops all bookkeeping for the client. Saves when the last one leaves.
    pub fn on_client_left(&self, client: ClientId) {
        self.ensure_loaded();
        if !self.enabled() {
            return;
        }

        let now_empty = {
            let mut clients = self.clients.write();
            clients.retain(|id| *id != client);
            clients.is_empty()
        };
        self.forget(client);
        info!("{} left", client);

        if now_empty && self.persistence.is_dirty() {
            // Failure is logged and retried on the next tick.
            let _ = self.save_now();
        }
    }

    fn forget(&self, client: ClientId) {
        self.guard.mark_free(client);
        self.pending_seeds.remove(&client);
        self.debouncer.forget(&client);
        self.detector.forget(client);
        self.versions.invalidate(client);
        self.close_delays.lock().remove(&client);
    }

    /// Marks the client busy while a secondary container is open.
    pub fn on_container_opened(&self, client: ClientId) {
        if !self.enabled() {
            return;
        }
        self.guard.mark_busy(client);
        self.close_delays.lock().remove(&client);
    }

    /// Frees the client and schedules a sync attempt a few ticks later.
    ///
    /// Until the delay runs out the periodic scan leaves the client alone.
    pub fn on_container_closed(&self, client: ClientId) {
        if !self.enabled() {
            return;
        }
        self.guard.mark_free(client);
        let delay = self.config.container_close_delay_ticks;
        if delay == 0 {
            self.ensure_loaded();
            self.attempt_sync(client);
        } else {
            self.close_delays.lock().insert(client, delay);
        }
    }

    /// Handles a pickup, drop, craft or other local change.
    pub fn on_local_inventory_changed(&self, client: ClientId) -> CaptureOutcome {
        self.capture(client)
    }

    /// Re-applies the shared inventory after a respawn when inventories are
    /// kept on death.
    pub fn on_client_respawned(&self, client: ClientId) -> ApplyOutcome {
        if !self.enabled() {
            return ApplyOutcome::Skipped(SkipReason::Disabled);
        }
        if !self.link.keep_inventory_on_death {
            return ApplyOutcome::Skipped(SkipReason::InventoryNotKept);
        }
        self.versions.invalidate(client);
        self.apply_to(client)
    }

    /// Advances one game tick.
    ///
    /// Drains queued events, runs due container-close syncs, runs the
    /// backstop scan every `scan_interval_ticks`, and saves when due.
    pub fn on_periodic_tick(&self) {
        self.drain_intake();
        self.ensure_loaded();
        let tick = self.tick.fetch_add(1, Ordering::SeqCst) + 1;
        self.update_stats(|s| s.ticks += 1);

        if self.enabled() {
            for client in self.expire_close_delays() {
                self.attempt_sync(client);
            }

            if tick % self.config.scan_interval_ticks == 0 {
                let clients = self.connected_clients();
                for client in clients {
                    if self.close_delays.lock().contains_key(&client) {
                        continue;
                    }
                    self.attempt_sync(client);
                }
            }
        }

        if self.persistence.is_due(tick) {
            let _ = self.save_now();
        }
    }

    fn expire_close_delays(&self) -> Vec<ClientId> {
        let mut delays = self.close_delays.lock();
        let mut due = Vec::new();
        delays.retain(|client, remaining| {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                due.push(*client);
                false
            } else {
                true
            }
        });
        due
    }

    // ---- Administrative ----

    /// Forces the canonical state onto every connected client that is not
    /// busy. Returns how many were written.
    pub fn sync_all(&self) -> usize {
        self.ensure_loaded();
        if !self.enabled() {
            return 0;
        }
        let applied = self.fan_out(None, true);
        info!("Synced shared inventory to {} clients", applied);
        applied
    }

    /// Empties the canonical state and clears every client's sync history.
    ///
    /// Connected clients stay connected and become stale. Open containers
    /// stay open: busy marks and pending close delays survive a reset, and a
    /// client that was busy receives the empty state once it is free.
    pub fn reset(&self) {
        self.ensure_loaded();
        if !self.enabled() {
            return;
        }
        *self.state.write() = SlotState::empty();
        self.versions.reset();
        self.debouncer.clear();
        self.detector.clear();
        self.pending_seeds.clear();
        self.persistence.mark_dirty();
        self.update_stats(|s| s.resets += 1);
        info!("Shared inventory reset");
    }

    /// Resets and pushes the empty inventory to every client.
    pub fn reset_all(&self) -> usize {
        self.reset();
        self.sync_all()
    }

    /// Makes one client's inventory canonical regardless of debounce and
    /// change detection, then pushes it to everyone else.
    pub fn copy_from(&self, client: ClientId) -> CaptureOutcome {
        self.ensure_loaded();
        if !self.enabled() {
            return CaptureOutcome::Skipped(SkipReason::Disabled);
        }
        if !self.is_connected(client) {
            return self.skip_capture(client, SkipReason::UnknownClient);
        }
        if self.applying.contains(&client) {
            return self.skip_capture(client, SkipReason::InFlight);
        }
        if self.guard.is_busy(client) {
            return self.skip_capture(client, SkipReason::Busy);
        }
        let Some(live) = self.host.read_live_slots(client) else {
            return self.skip_capture(client, SkipReason::UnknownClient);
        };

        let version = self.commit(client, live);
        let propagated = self.fan_out(Some(client), true);
        info!("Copied shared inventory from {} (v{})", client, version);
        CaptureOutcome::Captured {
            version,
            propagated,
        }
    }

    // ---- Persistence ----

    /// Saves the canonical state now.
    ///
    /// # Errors
    ///
    /// Returns the storage or codec error. The state stays dirty and the next
    /// tick retries.
    pub fn save_now(&self) -> SyncResult<()> {
        self.ensure_loaded();
        let result = self.persistence.save_with(|| self.state.read().clone());
        match &result {
            Ok(()) => self.update_stats(|s| s.saves += 1),
            Err(_) => self.update_stats(|s| s.save_failures += 1),
        }
        result
    }

    /// Processes queued events and saves any unsaved state.
    ///
    /// # Errors
    ///
    /// Returns the error from the final save.
    pub fn shutdown(&self) -> SyncResult<()> {
        self.drain_intake();
        self.ensure_loaded();
        if self.persistence.is_dirty() {
            self.save_now()?;
        }
        info!("Sync engine shut down at v{}", self.version());
        Ok(())
    }

    /// Returns true if the canonical state has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.persistence.is_dirty()
    }

    // ---- Intake ----

    /// Returns a handle other threads can use to enqueue events.
    pub fn intake(&self) -> IntakeSender {
        self.intake_tx.clone()
    }

    /// Handles every queued event in arrival order. Returns how many ran.
    pub fn drain_intake(&self) -> usize {
        let events: Vec<SyncEvent> = self.intake_rx.lock().try_iter().collect();
        let count = events.len();
        for event in events {
            self.dispatch(event);
        }
        count
    }

    /// Routes one event to its entry point.
    pub fn dispatch(&self, event: SyncEvent) {
        match event {
            SyncEvent::ClientJoined(id) => {
                self.on_client_joined(id);
            }
            SyncEvent::ClientLeft(id) => self.on_client_left(id),
            SyncEvent::ContainerOpened(id) => self.on_container_opened(id),
            SyncEvent::ContainerClosed(id) => self.on_container_closed(id),
            SyncEvent::LocalInventoryChanged(id) => {
                self.on_local_inventory_changed(id);
            }
            SyncEvent::ClientRespawned(id) => {
                self.on_client_respawned(id);
            }
            SyncEvent::SyncAll => {
                self.sync_all();
            }
            SyncEvent::ResetAll => {
                self.reset_all();
            }
            SyncEvent::CopyFrom(id) => {
                self.copy_from(id);
            }
        }
    }

    // ---- Accessors ----

    /// Returns a copy of the canonical state.
    pub fn canonical_state(&self) -> SlotState {
        self.ensure_loaded();
        self.state.read().clone()
    }

    /// Returns the global version.
    pub fn version(&self) -> u64 {
        self.ensure_loaded();
        self.versions.current()
    }

    /// Returns connected clients in join order.
    pub fn connected_clients(&self) -> Vec<ClientId> {
        self.clients.read().clone()
    }

    /// Returns the client's sync bookkeeping, if connected.
    pub fn client_record(&self, client: ClientId) -> Option<ClientRecord> {
        if !self.is_connected(client) {
            return None;
        }
        Some(ClientRecord {
            client,
            busy: self.guard.is_busy(client),
            last_sync_at_millis: self.debouncer.last_accepted(&client),
            last_applied_version: self.versions.last_applied(client),
            last_known_snapshot: self.detector.snapshot(client),
        })
    }

    /// Returns activity counters.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Returns the sync configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the link configuration.
    pub fn link_config(&self) -> &LinkConfig {
        &self.link
    }

    /// Returns the inventory host.
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Returns the broadcaster.
    pub fn broadcaster(&self) -> &Arc<B> {
        &self.broadcaster
    }

    /// Returns the record store.
    pub fn store(&self) -> &Arc<S> {
        self.persistence.store()
    }
}
