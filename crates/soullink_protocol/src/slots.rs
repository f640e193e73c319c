//! The 41-slot inventory and its versioned canonical state.

use crate::error::{ProtocolError, ProtocolResult};
use crate::item::ItemStack;
use std::ops::Index;

/// Total inventory size: 36 main + 4 armor + 1 offhand.
pub const INVENTORY_SIZE: usize = 41;

/// First hotbar slot (hotbar is 0-8).
pub const HOTBAR_START: usize = 0;
/// First main inventory slot (main is 9-35).
pub const MAIN_START: usize = 9;
/// First armor slot (boots, leggings, chestplate, helmet: 36-39).
pub const ARMOR_START: usize = 36;
/// The offhand slot.
pub const OFFHAND_SLOT: usize = 40;

/// A full inventory: exactly [`INVENTORY_SIZE`] slots.
///
/// # Invariants
///
/// - The length is always [`INVENTORY_SIZE`]
/// - A slot is either `None` (empty) or a non-empty [`ItemStack`];
///   zero-count stacks are normalized to `None` on the way in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slots(Vec<Option<ItemStack>>);

impl Slots {
    /// Creates an inventory with every slot empty.
    #[must_use]
    pub fn empty() -> Self {
        Self(vec![None; INVENTORY_SIZE])
    }

    /// Builds an inventory from a full slot vector.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::SlotCount`] unless the vector holds exactly
    /// [`INVENTORY_SIZE`] entries.
    pub fn from_vec(slots: Vec<Option<ItemStack>>) -> ProtocolResult<Self> {
        if slots.len() != INVENTORY_SIZE {
            return Err(ProtocolError::SlotCount {
                expected: INVENTORY_SIZE,
                actual: slots.len(),
            });
        }
        Ok(Self(slots.into_iter().map(normalize).collect()))
    }

    /// Builds an inventory from `(index, stack)` pairs; unlisted slots are empty.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::SlotIndex`] for an index outside the inventory.
    pub fn from_pairs<I>(pairs: I) -> ProtocolResult<Self>
    where
        I: IntoIterator<Item = (usize, ItemStack)>,
    {
        let mut slots = Self::empty();
        for (index, stack) in pairs {
            slots.set(index, Some(stack))?;
        }
        Ok(slots)
    }

    /// Returns the stack in a slot, if any.
    pub fn get(&self, index: usize) -> Option<&ItemStack> {
        self.0.get(index).and_then(Option::as_ref)
    }

    /// Replaces the content of a slot.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::SlotIndex`] if `index` is out of range.
    pub fn set(&mut self, index: usize, stack: Option<ItemStack>) -> ProtocolResult<()> {
        let slot = self
            .0
            .get_mut(index)
            .ok_or(ProtocolError::SlotIndex(index))?;
        *slot = normalize(stack);
        Ok(())
    }

    /// Iterates over every slot in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Option<ItemStack>> {
        self.0.iter()
    }

    /// Iterates over occupied slots as `(index, stack)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|stack| (index, stack)))
    }

    /// Returns the number of occupied slots.
    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    /// Returns true if every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Returns the first slot index whose contents differ from `other`.
    pub fn first_difference(&self, other: &Slots) -> Option<usize> {
        self.0
            .iter()
            .zip(other.0.iter())
            .position(|(mine, theirs)| mine != theirs)
    }

    /// Returns the slots as a slice.
    pub fn as_slice(&self) -> &[Option<ItemStack>] {
        &self.0
    }

    /// Consumes the inventory, returning the slot vector.
    pub fn into_vec(self) -> Vec<Option<ItemStack>> {
        self.0
    }
}

impl Default for Slots {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index<usize> for Slots {
    type Output = Option<ItemStack>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

fn normalize(stack: Option<ItemStack>) -> Option<ItemStack> {
    stack.filter(|stack| !stack.is_empty())
}

/// The canonical shared inventory together with its version.
///
/// The version is bumped exactly once per accepted capture and travels with
/// the slots through persistence so that a restored state keeps its order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlotState {
    /// The slot contents.
    pub slots: Slots,
    /// Monotonic capture counter.
    pub version: u64,
}

impl SlotState {
    /// Creates a state from slots and a version.
    #[must_use]
    pub fn new(slots: Slots, version: u64) -> Self {
        Self { slots, version }
    }

    /// Creates the all-empty state at version 0.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if every slot is empty, regardless of version.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
