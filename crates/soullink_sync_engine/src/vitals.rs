//! Linked health, hunger, knockback and death.
//!
//! Every fan-out here has the same shape as inventory propagation: one
//! client's event is replayed on every other connected client, and a
//! [`BusySet`] per vital stops the replay from triggering itself.

use crate::clock::{Clock, SystemClock};
use crate::config::LinkConfig;
use crate::debounce::Debouncer;
use crate::guard::BusySet;
use parking_lot::RwLock;
use soullink_protocol::ClientId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Minimum time between linked damage events for the same client.
pub const DAMAGE_COOLDOWN: Duration = Duration::from_millis(50);

/// Upper bound for food level and saturation.
pub const MAX_FOOD: u32 = 20;

const SATURATION_EPSILON: f32 = 0.001;

/// A velocity pushed onto a client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knockback {
    /// East-west component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
    /// North-south component.
    pub z: f64,
}

impl Knockback {
    /// Builds the linked knockback for a hit of `strength` from direction
    /// (`ratio_x`, `ratio_z`).
    ///
    /// Horizontal push is halved and points away from the ratio; vertical
    /// lift is capped at 0.4.
    pub fn from_hit(strength: f64, ratio_x: f64, ratio_z: f64) -> Self {
        let horizontal = strength * 0.5;
        Self {
            x: -ratio_x * horizontal,
            y: (strength * 0.4).min(0.4),
            z: -ratio_z * horizontal,
        }
    }
}

/// Access to connected clients' vitals.
pub trait VitalsHost: Send + Sync {
    /// Current health.
    fn health(&self, client: ClientId) -> f32;
    /// Deals damage from a neutral source.
    fn hurt(&self, client: ClientId, amount: f32);
    /// Restores health.
    fn heal(&self, client: ClientId, amount: f32);
    /// Sets health directly.
    fn set_health(&self, client: ClientId, health: f32);
    /// Current food level, 0 to 20.
    fn food_level(&self, client: ClientId) -> u32;
    /// Current saturation, 0 to 20.
    fn saturation(&self, client: ClientId) -> f32;
    /// Sets the food level.
    fn set_food_level(&self, client: ClientId, food: u32);
    /// Sets saturation.
    fn set_saturation(&self, client: ClientId, saturation: f32);
    /// Returns true if the client is dead or dying.
    fn is_dead(&self, client: ClientId) -> bool;
    /// Pushes a velocity onto the client.
    fn send_knockback(&self, client: ClientId, knockback: Knockback);
    /// Shows a message to the client.
    fn notify(&self, client: ClientId, message: &str);
}

/// Replays vitals events across all connected clients.
pub struct VitalsLink<V> {
    link: LinkConfig,
    host: Arc<V>,
    clock: Arc<dyn Clock>,
    clients: RwLock<Vec<ClientId>>,
    damage: BusySet<ClientId>,
    healing: BusySet<ClientId>,
    knockback: BusySet<ClientId>,
    hunger: BusySet<ClientId>,
    damage_cooldown: Debouncer<ClientId>,
    last_food: RwLock<HashMap<ClientId, (u32, f32)>>,
}

impl<V: VitalsHost> VitalsLink<V> {
    /// Creates a link over `host`.
    pub fn new(link: LinkConfig, host: Arc<V>) -> Self {
        Self {
            link,
            host,
            clock: Arc::new(SystemClock::new()),
            clients: RwLock::new(Vec::new()),
            damage: BusySet::new(),
            healing: BusySet::new(),
            knockback: BusySet::new(),
            hunger: BusySet::new(),
            damage_cooldown: Debouncer::new(DAMAGE_COOLDOWN),
            last_food: RwLock::new(HashMap::new()),
        }
    }

    /// Replaces the time source used for the damage cooldown.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the host.
    pub fn host(&self) -> &Arc<V> {
        &self.host
    }

    /// Returns connected clients in join order.
    pub fn connected_clients(&self) -> Vec<ClientId> {
        self.clients.read().clone()
    }

    fn linked(&self) -> bool {
        let count = self.clients.read().len();
        u32::try_from(count).unwrap_or(u32::MAX) >= self.link.min_players_for_link
    }

    fn live_targets(&self, source: ClientId) -> Vec<ClientId> {
        self.clients
            .read()
            .iter()
            .copied()
            .filter(|&id| id != source && !self.host.is_dead(id))
            .collect()
    }

    fn message(&self, client: ClientId, message: &str) {
        if self.link.show_link_messages {
            self.host.notify(client, message);
        }
    }

    /// Registers a client and remembers its hunger baseline.
    pub fn on_joined(&self, client: ClientId) {
        let others = {
            let mut clients = self.clients.write();
            if !clients.contains(&client) {
                clients.push(client);
            }
            clients.len() - 1
        };
        self.last_food.write().insert(
            client,
            (self.host.food_level(client), self.host.saturation(client)),
        );
        self.message(
            client,
            &format!("Your soul is now linked with {} other player(s)!", others),
        );
    }

    /// Forgets everything about a client.
    pub fn on_left(&self, client: ClientId) {
        self.clients.write().retain(|id| *id != client);
        self.last_food.write().remove(&client);
        self.damage.remove(&client);
        self.healing.remove(&client);
        self.knockback.remove(&client);
        self.hunger.remove(&client);
        self.damage_cooldown.forget(&client);
    }

    /// Shares damage taken by `source`. Returns how many clients were hurt.
    ///
    /// `attacker` is the client that dealt the damage, if any.
    pub fn on_damaged(&self, source: ClientId, amount: f32, attacker: Option<ClientId>) -> usize {
        if !self.link.link_damage || self.damage.contains(&source) {
            return 0;
        }
        if !self.linked() {
            return 0;
        }
        if self.link.prevent_pvp_loop && attacker.is_some_and(|a| self.damage.contains(&a)) {
            debug!("Ignoring damage to {} from a linked attacker", source);
            return 0;
        }
        let linked = amount * self.link.damage_multiplier as f32;
        if linked <= 0.0 {
            return 0;
        }
        let now = self.clock.now_millis();
        if !self.damage_cooldown.try_acquire(source, now) {
            return 0;
        }
        let Some(_source) = self.damage.try_enter(source) else {
            return 0;
        };

        let mut hurt = 0;
        for target in self.live_targets(source) {
            let Some(_target) = self.damage.try_enter(target) else {
                continue;
            };
            self.damage_cooldown.record(target, now);
            self.host.hurt(target, linked);
            self.message(target, "You felt a linked soul's pain!");
            hurt += 1;
        }
        hurt
    }

    /// Shares healing received by `source`. Returns how many clients healed.
    pub fn on_healed(&self, source: ClientId, amount: f32) -> usize {
        if !self.link.link_healing || self.healing.contains(&source) || !self.linked() {
            return 0;
        }
        let linked = amount * self.link.healing_multiplier as f32;
        if linked <= 0.0 {
            return 0;
        }
        let Some(_source) = self.healing.try_enter(source) else {
            return 0;
        };

        let mut healed = 0;
        for target in self.live_targets(source) {
            let Some(_target) = self.healing.try_enter(target) else {
                continue;
            };
            self.host.heal(target, linked);
            self.message(target, "You felt a linked soul's vitality!");
            healed += 1;
        }
        healed
    }

    /// Shares a knockback hit. Hits that were blocked are not shared.
    pub fn on_knockback(
        &self,
        source: ClientId,
        strength: f64,
        ratio_x: f64,
        ratio_z: f64,
        blocking: bool,
    ) -> usize {
        if !self.link.link_knockback || blocking || self.knockback.contains(&source) {
            return 0;
        }
        if !self.linked() {
            return 0;
        }
        let Some(_source) = self.knockback.try_enter(source) else {
            return 0;
        };

        let push = Knockback::from_hit(strength * self.link.knockback_multiplier, ratio_x, ratio_z);
        let targets = self.live_targets(source);
        for &target in &targets {
            self.host.send_knockback(target, push);
        }
        targets.len()
    }

    /// Kills every other client when death is shared.
    pub fn on_death(&self, source: ClientId) -> usize {
        if !self.link.share_death || !self.linked() {
            return 0;
        }
        let mut killed = 0;
        for target in self.live_targets(source) {
            let Some(_target) = self.damage.try_enter(target) else {
                continue;
            };
            self.message(target, "A linked soul died. Your souls are linked in death!");
            self.host.hurt(target, f32::MAX);
            killed += 1;
        }
        info!("{} died, took {} linked souls along", source, killed);
        killed
    }

    /// Shares any change in the client's food level and saturation since the
    /// previous tick. Returns how many clients were updated.
    pub fn on_player_tick(&self, client: ClientId) -> usize {
        if !self.link.link_hunger && !self.link.link_saturation {
            return 0;
        }
        if self.hunger.contains(&client) {
            return 0;
        }

        let food = self.host.food_level(client);
        let saturation = self.host.saturation(client);
        let (prev_food, prev_saturation) = self
            .last_food
            .write()
            .insert(client, (food, saturation))
            .unwrap_or((food, saturation));

        let food_change = i64::from(food) - i64::from(prev_food);
        let saturation_change = saturation - prev_saturation;
        if food_change == 0 && saturation_change.abs() < SATURATION_EPSILON {
            return 0;
        }
        if !self.linked() {
            return 0;
        }

        let multiplier = self.link.hunger_multiplier;
        let linked_food = (food_change as f64 * multiplier).round() as i64;
        let linked_saturation = saturation_change * multiplier as f32;
        let Some(_source) = self.hunger.try_enter(client) else {
            return 0;
        };

        let mut updated = 0;
        for target in self.live_targets(client) {
            let Some(_target) = self.hunger.try_enter(target) else {
                continue;
            };
            let mut food = self.host.food_level(target);
            let mut saturation = self.host.saturation(target);

            if self.link.link_hunger && linked_food != 0 {
                food = clamp_food(i64::from(food) + linked_food);
                self.host.set_food_level(target, food);
            }
            if self.link.link_saturation && linked_saturation.abs() > SATURATION_EPSILON {
                saturation = clamp_saturation(saturation + linked_saturation);
                self.host.set_saturation(target, saturation);
            }
            self.last_food.write().insert(target, (food, saturation));

            if linked_food > 0 {
                self.message(target, "You shared a linked soul's meal!");
            } else if linked_food < 0 {
                self.message(target, "You felt a linked soul's hunger!");
            }
            updated += 1;
        }
        updated
    }

    /// Sets every client's health, food and saturation to the average across
    /// all connected clients. Returns how many clients were updated.
    pub fn sync_vitals(&self) -> usize {
        let clients = self.connected_clients();
        if clients.is_empty() {
            return 0;
        }
        let count = clients.len();

        let total_health: f32 = clients.iter().map(|&id| self.host.health(id)).sum();
        let total_food: u64 = clients
            .iter()
            .map(|&id| u64::from(self.host.food_level(id)))
            .sum();
        let total_saturation: f32 = clients.iter().map(|&id| self.host.saturation(id)).sum();

        let health = total_health / count as f32;
        let food = u32::try_from(total_food / count as u64).unwrap_or(MAX_FOOD);
        let saturation = total_saturation / count as f32;

        for &client in &clients {
            self.host.set_health(client, health);
            self.host.set_food_level(client, food);
            self.host.set_saturation(client, saturation);
            self.last_food.write().insert(client, (food, saturation));
            self.host
                .notify(client, "Your vitals have been synchronized with all players!");
        }
        info!(
            "Synchronized vitals of {} players (health {:.1}, food {}, saturation {:.1})",
            count, health, food, saturation
        );
        count
    }
}

fn clamp_food(food: i64) -> u32 {
    u32::try_from(food.clamp(0, i64::from(MAX_FOOD))).unwrap_or(MAX_FOOD)
}

fn clamp_saturation(saturation: f32) -> f32 {
    saturation.clamp(0.0, MAX_FOOD as f32)
}

/// One client's vitals in a [`MemoryVitalsHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct VitalsState {
    /// Health, 0 to 20.
    pub health: f32,
    /// Food level, 0 to 20.
    pub food: u32,
    /// Saturation, 0 to 20.
    pub saturation: f32,
    /// Knockbacks received, oldest first.
    pub knockbacks: Vec<Knockback>,
    /// Messages shown, oldest first.
    pub messages: Vec<String>,
}

impl Default for VitalsState {
    fn default() -> Self {
        Self {
            health: 20.0,
            food: MAX_FOOD,
            saturation: 5.0,
            knockbacks: Vec::new(),
            messages: Vec::new(),
        }
    }
}

/// An in-memory [`VitalsHost`].
#[derive(Debug, Default)]
pub struct MemoryVitalsHost {
    clients: RwLock<HashMap<ClientId, VitalsState>>,
}

impl MemoryVitalsHost {
    /// Creates a host with no clients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a client with full vitals and returns its id.
    pub fn connect(&self) -> ClientId {
        let client = ClientId::new();
        self.clients.write().insert(client, VitalsState::default());
        client
    }

    /// Returns a copy of a client's vitals.
    pub fn state(&self, client: ClientId) -> Option<VitalsState> {
        self.clients.read().get(&client).cloned()
    }

    fn with<F: FnOnce(&mut VitalsState)>(&self, client: ClientId, f: F) {
        if let Some(state) = self.clients.write().get_mut(&client) {
            f(state);
        }
    }

    fn read<T: Default, F: FnOnce(&VitalsState) -> T>(&self, client: ClientId, f: F) -> T {
        self.clients.read().get(&client).map(f).unwrap_or_default()
    }
}

impl VitalsHost for MemoryVitalsHost {
    fn health(&self, client: ClientId) -> f32 {
        self.read(client, |s| s.health)
    }

    fn hurt(&self, client: ClientId, amount: f32) {
        self.with(client, |s| s.health = (s.health - amount).max(0.0));
    }

    fn heal(&self, client: ClientId, amount: f32) {
        self.with(client, |s| s.health = (s.health + amount).min(20.0));
    }

    fn set_health(&self, client: ClientId, health: f32) {
        self.with(client, |s| s.health = health);
    }

    fn food_level(&self, client: ClientId) -> u32 {
        self.read(client, |s| s.food)
    }

    fn saturation(&self, client: ClientId) -> f32 {
        self.read(client, |s| s.saturation)
    }

    fn set_food_level(&self, client: ClientId, food: u32) {
        self.with(client, |s| s.food = food);
    }

    fn set_saturation(&self, client: ClientId, saturation: f32) {
        self.with(client, |s| s.saturation = saturation);
    }

    fn is_dead(&self, client: ClientId) -> bool {
        self.read(client, |s| s.health <= 0.0)
    }

    fn send_knockback(&self, client: ClientId, knockback: Knockback) {
        self.with(client, |s| s.knockbacks.push(knockback));
    }

    fn notify(&self, client: ClientId, message: &str) {
        self.with(client, |s| s.messages.push(message.to_string()));
    }
}
