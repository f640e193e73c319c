//! # SoulLink Protocol
//!
//! Shared inventory data types and the persisted record codec for SoulLink.
//!
//! This crate provides:
//! - `ItemStack` for opaque item values
//! - `Slots` and `SlotState` for the 41-slot canonical inventory
//! - `ClientId` for keying per-client bookkeeping
//! - `SavedInventory` with CBOR encoding for world-save records
//!
//! This is a pure data crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod item;
mod record;
mod slots;

pub use error::{ProtocolError, ProtocolResult};
pub use item::{ClientId, ItemStack};
pub use record::{SavedInventory, SavedSlot, RECORD_FORMAT};
pub use slots::{
    SlotState, Slots, ARMOR_START, HOTBAR_START, INVENTORY_SIZE, MAIN_START, OFFHAND_SLOT,
};
