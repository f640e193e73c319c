//! Integration tests for the shared inventory sync engine.

use proptest::prelude::*;
use soullink_protocol::{ClientId, ItemStack, Slots, INVENTORY_SIZE};
use soullink_storage::{FileStore, InMemoryStore, RecordStore};
use soullink_sync_engine::{
    ApplyOutcome, Broadcaster, CaptureOutcome, InventoryHost, IntakeSender, JoinOutcome,
    LinkConfig, ManualClock, MemoryHost, RecordingBroadcaster, SkipReason, SyncConfig, SyncEngine,
    SyncEvent, DEFAULT_RECORD_NAME,
};
use std::sync::{Arc, OnceLock};

type Engine<S = InMemoryStore> = SyncEngine<MemoryHost, RecordingBroadcaster, S>;

struct Harness<S: RecordStore = InMemoryStore> {
    engine: Engine<S>,
    clock: Arc<ManualClock>,
}

impl<S: RecordStore> Harness<S> {
    fn with_store(store: Arc<S>) -> Self {
        let clock = Arc::new(ManualClock::new(50_000));
        let engine = SyncEngine::new(
            SyncConfig::default(),
            LinkConfig::default(),
            Arc::new(MemoryHost::new()),
            Arc::new(RecordingBroadcaster::new()),
            store,
        )
        .unwrap()
        .with_clock(clock.clone());
        Self { engine, clock }
    }

    fn host(&self) -> &MemoryHost {
        self.engine.host()
    }

    fn broadcaster(&self) -> &RecordingBroadcaster {
        self.engine.broadcaster()
    }

    fn join(&self, slots: Slots) -> ClientId {
        let client = self.host().connect(slots);
        self.engine.on_client_joined(client);
        client
    }

    /// Moves past the debounce window.
    fn settle(&self) {
        self.clock.advance(200);
    }

    fn ticks(&self, n: usize) {
        for _ in 0..n {
            self.engine.on_periodic_tick();
        }
    }
}

impl Harness<InMemoryStore> {
    fn new() -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()))
    }
}

fn sword() -> ItemStack {
    ItemStack::new("minecraft:diamond_sword", 1)
}

fn kit(pairs: &[(usize, &str, u32)]) -> Slots {
    Slots::from_pairs(
        pairs
            .iter()
            .map(|&(slot, item, count)| (slot, ItemStack::new(item, count))),
    )
    .unwrap()
}

// ---- Scenarios ----

#[test]
fn first_joiner_seeds_canonical_state() {
    let h = Harness::new();
    let live = Slots::from_pairs([(0, sword())]).unwrap();
    let a = h.host().connect(live.clone());

    let outcome = h.engine.on_client_joined(a);

    assert_eq!(
        outcome,
        JoinOutcome::Seeded(CaptureOutcome::Captured {
            version: 1,
            propagated: 0
        })
    );
    let state = h.engine.canonical_state();
    assert_eq!(state.slots, live);
    assert_eq!(state.version, 1);
    assert_eq!(h.engine.version(), 1);
}

#[test]
fn second_joiner_mirrors_canonical_state() {
    let h = Harness::new();
    let a = h.join(Slots::from_pairs([(0, sword())]).unwrap());
    let b = h.host().connect(kit(&[(5, "minecraft:dirt", 64)]));

    let outcome = h.engine.on_client_joined(b);

    assert_eq!(
        outcome,
        JoinOutcome::Mirrored(ApplyOutcome::Applied { version: 1 })
    );
    assert_eq!(h.host().live(b), h.host().live(a));
    assert_eq!(h.engine.client_record(b).unwrap().last_applied_version, Some(1));
    assert_eq!(h.engine.version(), 1);
}

#[test]
fn joiner_seeds_when_canonical_state_is_empty() {
    let h = Harness::new();
    let _a = h.join(Slots::empty());
    let b = h.host().connect(kit(&[(3, "minecraft:bread", 4)]));

    let outcome = h.engine.on_client_joined(b);

    assert!(matches!(outcome, JoinOutcome::Seeded(c) if c.is_captured()));
    assert_eq!(h.engine.canonical_state().slots, kit(&[(3, "minecraft:bread", 4)]));
}

#[test]
fn capture_propagates_to_every_other_client() {
    let h = Harness::new();
    let a = h.join(Slots::from_pairs([(0, sword())]).unwrap());
    let b = h.join(Slots::empty());
    let c = h.join(Slots::empty());
    h.settle();
    h.broadcaster().clear();
    let before = h.engine.version();

    let changed = kit(&[(0, "minecraft:diamond_sword", 1), (9, "minecraft:torch", 32)]);
    h.host().set_live(a, changed.clone());
    let outcome = h.engine.on_local_inventory_changed(a);

    assert_eq!(
        outcome,
        CaptureOutcome::Captured {
            version: before + 1,
            propagated: 2
        }
    );
    assert_eq!(h.host().live(b), Some(changed.clone()));
    assert_eq!(h.host().live(c), Some(changed));
    assert_eq!(h.broadcaster().versions_for(b), vec![before + 1]);
    assert_eq!(h.broadcaster().versions_for(c), vec![before + 1]);

    // The source already holds the new version and is not written back.
    assert_eq!(h.engine.client_record(a).unwrap().last_applied_version, Some(before + 1));
    assert!(h.broadcaster().versions_for(a).is_empty());
}

#[test]
fn busy_client_is_excluded_until_container_closes() {
    let h = Harness::new();
    let a = h.join(Slots::from_pairs([(0, sword())]).unwrap());
    let b = h.join(Slots::empty());
    h.settle();

    h.engine.on_container_opened(b);
    let changed = kit(&[(0, "minecraft:diamond_sword", 1), (1, "minecraft:apple", 3)]);
    h.host().set_live(a, changed.clone());
    let outcome = h.engine.on_local_inventory_changed(a);

    assert_eq!(
        outcome,
        CaptureOutcome::Captured {
            version: 2,
            propagated: 0
        }
    );
    assert_eq!(h.host().live(b), Some(Slots::from_pairs([(0, sword())]).unwrap()));

    // Scans while the container is open leave B alone.
    h.ticks(10);
    assert_eq!(h.host().live(b), Some(Slots::from_pairs([(0, sword())]).unwrap()));

    h.engine.on_container_closed(b);
    h.ticks(4);
    assert_ne!(h.host().live(b), Some(changed.clone()));
    h.ticks(1);
    assert_eq!(h.host().live(b), Some(changed));
    assert_eq!(h.engine.client_record(b).unwrap().last_applied_version, Some(2));
}

#[test]
fn busy_client_is_never_captured_or_applied() {
    let h = Harness::new();
    let a = h.join(Slots::from_pairs([(0, sword())]).unwrap());
    let b = h.join(Slots::empty());
    h.settle();

    h.engine.on_container_opened(b);
    h.host().set_live(b, kit(&[(7, "minecraft:gold_ingot", 9)]));
    assert_eq!(h.engine.capture(b), CaptureOutcome::Skipped(SkipReason::Busy));
    assert_eq!(h.engine.copy_from(b), CaptureOutcome::Skipped(SkipReason::Busy));

    h.engine.reset();
    assert_eq!(h.engine.apply_to(b), ApplyOutcome::Skipped(SkipReason::Busy));
    assert_eq!(h.host().live(b), Some(kit(&[(7, "minecraft:gold_ingot", 9)])));

    // Cursor-held is busy too, and is read live.
    h.host().set_cursor_held(a, true);
    assert_eq!(h.engine.apply_to(a), ApplyOutcome::Skipped(SkipReason::Busy));
    h.host().set_cursor_held(a, false);
    assert!(h.engine.apply_to(a).is_applied());
}

#[test]
fn reset_holds_for_client_busy_during_reset() {
    let h = Harness::new();
    let a = h.join(Slots::from_pairs([(0, sword())]).unwrap());
    let b = h.join(Slots::empty());
    h.settle();

    h.engine.on_container_opened(b);
    h.engine.reset_all();
    assert_eq!(h.host().live(a), Some(Slots::empty()));
    assert_eq!(h.host().live(b), Some(Slots::from_pairs([(0, sword())]).unwrap()));

    h.engine.on_container_closed(b);
    h.ticks(20);

    let state = h.engine.canonical_state();
    assert!(state.is_empty());
    assert_eq!(state.version, 0);
    assert_eq!(h.host().live(a), Some(Slots::empty()));
    assert_eq!(h.host().live(b), Some(Slots::empty()));
}

#[test]
fn busy_joiner_mirrors_once_free() {
    let h = Harness::new();
    let armed = Slots::from_pairs([(0, sword())]).unwrap();
    let a = h.join(armed.clone());
    let b = h.host().connect(kit(&[(5, "minecraft:dirt", 64)]));
    h.host().set_cursor_held(b, true);

    assert_eq!(
        h.engine.on_client_joined(b),
        JoinOutcome::Mirrored(ApplyOutcome::Skipped(SkipReason::Busy))
    );

    h.host().set_cursor_held(b, false);
    h.settle();
    h.ticks(20);

    assert_eq!(h.host().live(a), Some(armed.clone()));
    assert_eq!(h.host().live(b), Some(armed));
    assert_eq!(h.engine.version(), 1);
}

#[test]
fn change_from_unsynced_client_is_not_captured() {
    let h = Harness::new();
    let armed = Slots::from_pairs([(0, sword())]).unwrap();
    let a = h.join(armed.clone());
    let b = h.host().connect(kit(&[(5, "minecraft:dirt", 64)]));
    h.host().set_cursor_held(b, true);
    h.engine.on_client_joined(b);
    h.host().set_cursor_held(b, false);
    h.settle();

    assert_eq!(
        h.engine.on_local_inventory_changed(b),
        CaptureOutcome::Skipped(SkipReason::Unsynced)
    );
    assert_eq!(h.host().live(b), Some(armed.clone()));
    assert_eq!(h.host().live(a), Some(armed));
    assert_eq!(h.engine.version(), 1);
}

#[test]
fn busy_first_joiner_seeds_once_free() {
    let h = Harness::new();
    let armed = Slots::from_pairs([(0, sword())]).unwrap();
    let a = h.host().connect(armed.clone());
    h.host().set_cursor_held(a, true);

    assert_eq!(
        h.engine.on_client_joined(a),
        JoinOutcome::Seeded(CaptureOutcome::Skipped(SkipReason::Busy))
    );

    h.host().set_cursor_held(a, false);
    h.ticks(10);
    assert_eq!(h.engine.canonical_state().slots, armed);
    assert_eq!(h.engine.version(), 1);
}

#[test]
fn pending_seed_yields_to_later_seeder() {
    let h = Harness::new();
    let a = h.host().connect(Slots::from_pairs([(0, sword())]).unwrap());
    h.host().set_cursor_held(a, true);
    h.engine.on_client_joined(a);

    let bread = kit(&[(3, "minecraft:bread", 4)]);
    let b = h.join(bread.clone());
    assert_eq!(h.engine.canonical_state().slots, bread);

    h.host().set_cursor_held(a, false);
    h.ticks(10);
    assert_eq!(h.host().live(a), Some(bread.clone()));
    assert_eq!(h.host().live(b), Some(bread));
    assert_eq!(h.engine.version(), 1);
}

#[test]
fn reset_all_empties_every_client() {
    let h = Harness::new();
    let a = h.join(kit(&[(0, "minecraft:bow", 1), (40, "minecraft:shield", 1)]));
    let b = h.join(Slots::empty());
    let c = h.join(Slots::empty());

    let applied = h.engine.reset_all();

    assert_eq!(applied, 3);
    let state = h.engine.canonical_state();
    assert_eq!(state.slots.as_slice().len(), INVENTORY_SIZE);
    assert!(state.slots.is_empty());
    assert_eq!(state.version, 0);
    for client in [a, b, c] {
        assert_eq!(h.host().live(client), Some(Slots::empty()));
    }
    assert!(h.engine.is_dirty());
}

#[test]
fn copy_from_makes_client_canonical_and_syncs_all() {
    let h = Harness::new();
    let a = h.join(Slots::from_pairs([(0, sword())]).unwrap());
    let b = h.join(Slots::empty());
    let c = h.join(Slots::empty());

    // Inside the debounce window and without a change event.
    let chosen = kit(&[(12, "minecraft:cake", 1)]);
    h.host().set_live(c, chosen.clone());
    let outcome = h.engine.copy_from(c);

    assert_eq!(
        outcome,
        CaptureOutcome::Captured {
            version: 2,
            propagated: 2
        }
    );
    assert_eq!(h.host().live(a), Some(chosen.clone()));
    assert_eq!(h.host().live(b), Some(chosen));
}

#[test]
fn sync_all_repairs_drifted_clients() {
    let h = Harness::new();
    let a = h.join(Slots::from_pairs([(0, sword())]).unwrap());
    let b = h.join(Slots::empty());

    // Drift that the change detector has not seen yet.
    h.host().set_live(b, Slots::empty());
    assert_eq!(h.engine.sync_all(), 2);
    assert_eq!(h.host().live(b), h.host().live(a));
}

#[test]
fn periodic_scan_captures_unreported_change() {
    let h = Harness::new();
    let a = h.join(Slots::from_pairs([(0, sword())]).unwrap());
    let b = h.join(Slots::empty());
    h.settle();

    let changed = kit(&[(20, "minecraft:coal", 8)]);
    h.host().set_live(a, changed.clone());
    h.ticks(9);
    assert_eq!(h.engine.version(), 1);
    h.ticks(1);
    assert_eq!(h.engine.version(), 2);
    assert_eq!(h.host().live(b), Some(changed));
}

#[test]
fn leaving_drops_client_and_last_leave_saves() {
    let store = Arc::new(InMemoryStore::new());
    let h = Harness::with_store(Arc::clone(&store));
    let a = h.join(Slots::from_pairs([(0, sword())]).unwrap());
    let b = h.join(Slots::empty());

    h.engine.on_client_left(b);
    assert_eq!(h.engine.connected_clients(), vec![a]);
    assert_eq!(store.write_count(), 0);

    h.engine.on_client_left(a);
    assert!(h.engine.connected_clients().is_empty());
    assert_eq!(store.write_count(), 1);
    assert!(!h.engine.is_dirty());
}

// ---- Properties ----

#[test]
fn debounce_window_allows_one_capture() {
    let h = Harness::new();
    let a = h.join(Slots::from_pairs([(0, sword())]).unwrap());
    let _b = h.join(Slots::empty());
    h.settle();

    h.host().set_live(a, kit(&[(1, "minecraft:stick", 1)]));
    assert!(h.engine.on_local_inventory_changed(a).is_captured());

    h.clock.advance(149);
    h.host().set_live(a, kit(&[(1, "minecraft:stick", 2)]));
    assert_eq!(
        h.engine.on_local_inventory_changed(a),
        CaptureOutcome::Skipped(SkipReason::Debounced)
    );

    h.clock.advance(1);
    assert!(h.engine.on_local_inventory_changed(a).is_captured());
    assert_eq!(h.engine.version(), 3);
}

#[test]
fn propagate_skips_current_clients() {
    let h = Harness::new();
    let a = h.join(Slots::from_pairs([(0, sword())]).unwrap());
    let b = h.join(Slots::empty());
    let writes = h.host().write_count();

    assert_eq!(h.engine.propagate(a), 0);
    assert_eq!(h.host().write_count(), writes);
    assert_eq!(h.engine.apply_to(b), ApplyOutcome::Skipped(SkipReason::Current));
}

#[test]
fn apply_is_idempotent() {
    let h = Harness::new();
    let _a = h.join(kit(&[(0, "minecraft:bow", 1), (36, "minecraft:iron_helmet", 1)]));
    let b = h.join(Slots::empty());

    let once = h.host().live(b);
    h.engine.sync_all();
    assert_eq!(h.host().live(b), once);
    h.engine.apply_to(b);
    assert_eq!(h.host().live(b), once);
}

proptest! {
    #[test]
    fn version_is_strictly_monotonic(
        steps in prop::collection::vec((0usize..3, 0u64..400, 0usize..INVENTORY_SIZE), 1..40)
    ) {
        let h = Harness::new();
        let clients = [
            h.join(Slots::from_pairs([(0, sword())]).unwrap()),
            h.join(Slots::empty()),
            h.join(Slots::empty()),
        ];
        let mut last = h.engine.version();
        let mut seen = vec![last];

        for (i, (who, wait, slot)) in steps.into_iter().enumerate() {
            h.clock.advance(wait);
            let client = clients[who];
            let mut live = h.host().live(client).unwrap();
            live.set(slot, Some(ItemStack::new("minecraft:stone", i as u32 + 1))).unwrap();
            h.host().set_live(client, live);

            match h.engine.on_local_inventory_changed(client) {
                CaptureOutcome::Captured { version, .. } => {
                    prop_assert_eq!(version, last + 1);
                    prop_assert!(!seen.contains(&version));
                    seen.push(version);
                    last = version;
                }
                CaptureOutcome::Skipped(_) => prop_assert_eq!(h.engine.version(), last),
            }
        }
    }
}

// ---- Persistence ----

#[test]
fn state_survives_restart() {
    let store = Arc::new(InMemoryStore::new());
    let saved = {
        let h = Harness::with_store(Arc::clone(&store));
        let _a = h.join(kit(&[(0, "minecraft:bow", 1), (8, "minecraft:arrow", 64)]));
        h.engine.shutdown().unwrap();
        h.engine.canonical_state()
    };

    let h = Harness::with_store(store);
    assert_eq!(h.engine.canonical_state(), saved);
    assert_eq!(h.engine.version(), 1);
    assert!(!h.engine.is_dirty());

    // A second player joins the restored world and is mirrored.
    let _a = h.join(saved.slots.clone());
    h.settle();
    let b = h.join(Slots::empty());
    assert_eq!(h.host().live(b), Some(saved.slots));
}

#[test]
fn corrupt_record_starts_empty() {
    let store = Arc::new(InMemoryStore::with_record(DEFAULT_RECORD_NAME, b"not cbor".to_vec()));
    let h = Harness::with_store(store);
    assert_eq!(h.engine.version(), 0);
    assert!(h.engine.canonical_state().is_empty());
}

#[test]
fn failed_save_is_retried_next_tick() {
    let store = Arc::new(InMemoryStore::new());
    let h = Harness::with_store(Arc::clone(&store));
    let _a = h.join(Slots::from_pairs([(0, sword())]).unwrap());

    store.set_available(false);
    h.ticks(200);
    assert!(h.engine.is_dirty());
    assert_eq!(h.engine.stats().save_failures, 1);

    h.ticks(1);
    assert_eq!(h.engine.stats().save_failures, 2);

    store.set_available(true);
    h.ticks(1);
    assert!(!h.engine.is_dirty());
    assert_eq!(h.engine.stats().saves, 1);
}

#[test]
fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let slots = kit(&[(2, "minecraft:compass", 1)]);

    {
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let h = Harness::with_store(store);
        let a = h.join(slots.clone());
        h.engine.on_client_left(a);
    }

    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let h = Harness::with_store(store);
    assert_eq!(h.engine.canonical_state().slots, slots);
    assert_eq!(h.engine.version(), 1);
}

// ---- Re-entrancy and intake ----

/// A host that reports every write back as a local inventory change, the way
/// a game fires slot-change events for programmatic edits.
struct EchoingHost {
    inner: MemoryHost,
    intake: OnceLock<IntakeSender>,
}

impl InventoryHost for EchoingHost {
    fn read_live_slots(&self, client: ClientId) -> Option<Slots> {
        self.inner.read_live_slots(client)
    }

    fn write_live_slots(&self, client: ClientId, slots: &Slots) {
        self.inner.write_live_slots(client, slots);
        if let Some(intake) = self.intake.get() {
            intake.send(SyncEvent::LocalInventoryChanged(client));
        }
    }

    fn is_cursor_held(&self, client: ClientId) -> bool {
        self.inner.is_cursor_held(client)
    }
}

#[test]
fn applied_state_is_not_recaptured() {
    let host = Arc::new(EchoingHost {
        inner: MemoryHost::new(),
        intake: OnceLock::new(),
    });
    let clock = Arc::new(ManualClock::new(0));
    let engine = SyncEngine::new(
        SyncConfig::default(),
        LinkConfig::default(),
        Arc::clone(&host),
        Arc::new(RecordingBroadcaster::new()),
        Arc::new(InMemoryStore::new()),
    )
    .unwrap()
    .with_clock(clock.clone());
    host.intake.set(engine.intake()).unwrap();

    let a = host.inner.connect(Slots::from_pairs([(0, sword())]).unwrap());
    let b = host.inner.connect(Slots::empty());
    engine.on_client_joined(a);
    engine.on_client_joined(b);
    clock.advance(1_000);

    assert_eq!(engine.drain_intake(), 1);
    assert_eq!(engine.version(), 1);
}

#[test]
fn events_from_other_threads_are_serialized() {
    let h = Harness::new();
    let a = h.host().connect(Slots::from_pairs([(0, sword())]).unwrap());
    let b = h.host().connect(Slots::empty());

    let handles: Vec<_> = [a, b]
        .into_iter()
        .map(|client| {
            let intake = h.engine.intake();
            std::thread::spawn(move || intake.send(SyncEvent::ClientJoined(client)))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }

    h.engine.on_periodic_tick();
    assert_eq!(h.engine.connected_clients().len(), 2);
    assert_eq!(h.host().live(a), h.host().live(b));
}

#[test]
fn broadcaster_trait_object_is_usable() {
    let recorder = RecordingBroadcaster::new();
    let sink: &dyn Broadcaster = &recorder;
    sink.broadcast(ClientId::new(), &Default::default());
    assert_eq!(recorder.sent().len(), 1);
}
