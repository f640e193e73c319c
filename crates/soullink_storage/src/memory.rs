//! In-memory record store for testing.

use crate::error::{StorageError, StorageResult};
use crate::store::{validate_record_name, RecordStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// An in-memory record store.
///
/// Suitable for unit tests, integration tests and worlds that don't need
/// persistence. The store can be switched unavailable to simulate a failing
/// save target.
///
/// # Example
///
/// ```rust
/// use soullink_storage::{RecordStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// store.write("record", &[1, 2, 3]).unwrap();
/// assert_eq!(store.write_count(), 1);
///
/// store.set_available(false);
/// assert!(store.write("record", &[4]).is_err());
///
/// store.set_available(true);
/// assert_eq!(store.read("record").unwrap(), Some(vec![1, 2, 3]));
/// ```
#[derive(Debug)]
pub struct InMemoryStore {
    records: RwLock<BTreeMap<String, Vec<u8>>>,
    available: AtomicBool,
    writes: AtomicU64,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
            writes: AtomicU64::new(0),
        }
    }

    /// Creates a store pre-seeded with one record.
    ///
    /// Useful for testing load and recovery scenarios.
    #[must_use]
    pub fn with_record(name: &str, data: Vec<u8>) -> Self {
        let store = Self::new();
        store.records.write().insert(name.to_string(), data);
        store
    }

    /// Makes every operation fail with [`StorageError::Unavailable`] while
    /// `available` is false.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Returns the number of successful writes.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryStore {
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_record_name(name)?;
        self.check_available()?;
        Ok(self.records.read().get(name).cloned())
    }

    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        validate_record_name(name)?;
        self.check_available()?;
        self.records.write().insert(name.to_string(), data.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        validate_record_name(name)?;
        self.check_available()?;
        self.records.write().remove(name);
        Ok(())
    }

    fn names(&self) -> StorageResult<Vec<String>> {
        self.check_available()?;
        Ok(self.records.read().keys().cloned().collect())
    }
}
