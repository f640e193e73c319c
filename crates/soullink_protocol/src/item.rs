//! Item values and client identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a connected client (player).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Generates a new random client ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for ClientId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A stack of items occupying one inventory slot.
///
/// The sync engine treats stacks as opaque values: it compares them
/// structurally (identifier, count and tag) and copies them, but never
/// interprets what the item is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Namespaced item identifier, e.g. `minecraft:diamond_sword`.
    pub item: String,
    /// Number of items in the stack.
    pub count: u32,
    /// Auxiliary data (enchantments, durability, custom NBT) as opaque bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Vec<u8>>,
}

impl ItemStack {
    /// Creates a stack without auxiliary data.
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
            tag: None,
        }
    }

    /// Attaches auxiliary data to the stack.
    #[must_use]
    pub fn with_tag(mut self, tag: Vec<u8>) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Returns true if this stack holds nothing.
    ///
    /// A zero count or a blank identifier never occupies a slot.
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item.is_empty()
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x {}", self.count, self.item)?;
        if let Some(tag) = &self.tag {
            write!(f, " [{} bytes]", tag.len())?;
        }
        Ok(())
    }
}
