//! # SoulLink Storage
//!
//! Named record stores backing SoulLink's world-save data.
//!
//! Record stores are **opaque byte stores** keyed by a record name. They do
//! not interpret the bytes they hold; the sync engine owns the record format.
//!
//! ## Design Principles
//!
//! - A record is written whole and read whole (snapshot, not incremental)
//! - A write either fully replaces the record or leaves the old one intact
//! - Must be `Send + Sync` for access from auxiliary threads
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and ephemeral worlds
//! - [`FileStore`] - One file per record inside a locked save directory
//!
//! ## Example
//!
//! ```rust
//! use soullink_storage::{RecordStore, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! store.write("soullink_shared_inventory", b"hello").unwrap();
//! let data = store.read("soullink_shared_inventory").unwrap();
//! assert_eq!(data.as_deref(), Some(&b"hello"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use store::{validate_record_name, RecordStore};
