//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The record name is not usable as a storage key.
    #[error("invalid record name: {0:?}")]
    InvalidName(String),

    /// Another process holds the save directory.
    #[error("save directory is locked by another process")]
    Locked,

    /// The store is unavailable.
    #[error("store is unavailable")]
    Unavailable,
}
