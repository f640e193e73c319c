//! Persisted record layout for the shared inventory.
//!
//! The record lists non-empty slots only, as `(slot index, item)` pairs,
//! alongside the version counter:
//!
//! ```text
//! { format: 1, version: u64, initialized: bool, slots: [{ slot, item }, ...] }
//! ```
//!
//! Records are encoded as CBOR. Slot indices outside the inventory are
//! ignored on load; when an index repeats, the later entry wins.

use crate::error::{ProtocolError, ProtocolResult};
use crate::item::ItemStack;
use crate::slots::{SlotState, Slots, INVENTORY_SIZE};
use serde::{Deserialize, Serialize};

/// Current record format revision.
pub const RECORD_FORMAT: u16 = 1;

/// One occupied slot in a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSlot {
    /// Slot index.
    pub slot: u32,
    /// Slot contents.
    pub item: ItemStack,
}

/// The shared inventory as written to the host's save data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedInventory {
    /// Record format revision.
    pub format: u16,
    /// Version counter at save time.
    pub version: u64,
    /// Whether the inventory had been seeded when saved.
    #[serde(default)]
    pub initialized: bool,
    /// Occupied slots.
    #[serde(default)]
    pub slots: Vec<SavedSlot>,
}

impl SavedInventory {
    /// Builds a record from a state snapshot.
    pub fn from_state(state: &SlotState) -> Self {
        Self {
            format: RECORD_FORMAT,
            version: state.version,
            initialized: true,
            slots: state
                .slots
                .occupied()
                .map(|(index, item)| SavedSlot {
                    slot: index as u32,
                    item: item.clone(),
                })
                .collect(),
        }
    }

    /// Converts the record back into a state, dropping out-of-range slots.
    pub fn into_state(self) -> SlotState {
        let mut slots = Slots::empty();
        for entry in self.slots {
            let index = entry.slot as usize;
            if index < INVENTORY_SIZE {
                // In range, so `set` cannot fail.
                let _ = slots.set(index, Some(entry.item));
            }
        }
        SlotState::new(slots, self.version)
    }

    /// Encodes to CBOR.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| ProtocolError::encode(e.to_string()))?;
        Ok(buf)
    }

    /// Decodes from CBOR.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Decode`] for malformed bytes and
    /// [`ProtocolError::UnsupportedFormat`] for an unknown format revision.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        let record: Self =
            ciborium::from_reader(bytes).map_err(|e| ProtocolError::decode(e.to_string()))?;
        if record.format != RECORD_FORMAT {
            return Err(ProtocolError::UnsupportedFormat {
                expected: RECORD_FORMAT,
                found: record.format,
            });
        }
        Ok(record)
    }
}

impl SlotState {
    /// Encodes this state as a persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    pub fn to_record_bytes(&self) -> ProtocolResult<Vec<u8>> {
        SavedInventory::from_state(self).encode()
    }

    /// Decodes a state from persisted record bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is malformed or of an unknown format.
    pub fn from_record_bytes(bytes: &[u8]) -> ProtocolResult<Self> {
        SavedInventory::decode(bytes).map(SavedInventory::into_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::{ARMOR_START, OFFHAND_SLOT};

    fn sample_state() -> SlotState {
        let slots = Slots::from_pairs([
            (0, ItemStack::new("minecraft:diamond_sword", 1).with_tag(vec![0x0a, 0x00])),
            (ARMOR_START, ItemStack::new("minecraft:iron_boots", 1)),
            (OFFHAND_SLOT, ItemStack::new("minecraft:torch", 32)),
        ])
        .unwrap();
        SlotState::new(slots, 12)
    }

    #[test]
    fn record_lists_only_occupied_slots() {
        let record = SavedInventory::from_state(&sample_state());
        assert_eq!(record.format, RECORD_FORMAT);
        assert_eq!(record.version, 12);
        let indices: Vec<u32> = record.slots.iter().map(|s| s.slot).collect();
        assert_eq!(indices, vec![0, 36, 40]);
    }

    #[test]
    fn encode_decode_state() {
        let state = sample_state();
        let bytes = state.to_record_bytes().unwrap();
        let decoded = SlotState::from_record_bytes(&bytes).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn out_of_range_slots_are_ignored() {
        let record = SavedInventory {
            format: RECORD_FORMAT,
            version: 3,
            initialized: true,
            slots: vec![
                SavedSlot {
                    slot: 99,
                    item: ItemStack::new("minecraft:bedrock", 1),
                },
                SavedSlot {
                    slot: 5,
                    item: ItemStack::new("minecraft:apple", 2),
                },
            ],
        };
        let state = record.into_state();
        assert_eq!(state.slots.occupied_count(), 1);
        assert_eq!(state.slots.get(5), Some(&ItemStack::new("minecraft:apple", 2)));
    }

    #[test]
    fn duplicate_slot_last_wins() {
        let record = SavedInventory {
            format: RECORD_FORMAT,
            version: 1,
            initialized: true,
            slots: vec![
                SavedSlot {
                    slot: 2,
                    item: ItemStack::new("minecraft:stone", 1),
                },
                SavedSlot {
                    slot: 2,
                    item: ItemStack::new("minecraft:cobblestone", 5),
                },
            ],
        };
        let state = record.into_state();
        assert_eq!(
            state.slots.get(2),
            Some(&ItemStack::new("minecraft:cobblestone", 5))
        );
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = SlotState::from_record_bytes(&[0xff, 0x00, 0x13]);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let mut record = SavedInventory::from_state(&sample_state());
        record.format = 7;
        let bytes = record.encode().unwrap();
        let result = SavedInventory::decode(&bytes);
        assert!(matches!(
            result,
            Err(ProtocolError::UnsupportedFormat { expected: 1, found: 7 })
        ));
    }
}
