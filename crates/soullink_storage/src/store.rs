//! Record store trait definition.

use crate::error::{StorageError, StorageResult};

/// A store of named, opaque byte records.
///
/// This models the host's save data: each feature keeps its state under its
/// own record name, and the store never looks inside the bytes.
///
/// # Invariants
///
/// - `read` returns exactly the bytes of the last successful `write`
/// - `write` replaces the whole record atomically
/// - `read` of a name never written (or removed) returns `Ok(None)`
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait RecordStore: Send + Sync {
    /// Reads a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an I/O error occurs.
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Writes a record, replacing any previous contents.
    ///
    /// After this returns successfully the record survives process
    /// termination (for durable stores).
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the write fails. A failed
    /// write leaves the previous record intact.
    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()>;

    /// Removes a record. Removing a missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an I/O error occurs.
    fn remove(&self, name: &str) -> StorageResult<()>;

    /// Lists the names of all stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn names(&self) -> StorageResult<Vec<String>>;
}

/// Checks that a record name is non-empty and limited to `[A-Za-z0-9_.-]`,
/// with no leading dot.
///
/// # Errors
///
/// Returns [`StorageError::InvalidName`] otherwise.
pub fn validate_record_name(name: &str) -> StorageResult<()> {
    let valid = !name.is_empty()
        && name.len() <= 128
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}
