//! Error types for the sync engine.

use soullink_protocol::ProtocolError;
use soullink_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur inside the sync engine.
///
/// None of these reach the host through the event entry points: the engine
/// logs them and carries on. They surface from the persistence adapter and
/// configuration checks.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The backing record store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A record could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] ProtocolError),

    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl SyncError {
    /// Returns true if retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Storage(StorageError::Io(_) | StorageError::Unavailable)
        )
    }
}

/// Errors found while validating configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A numeric setting is outside its allowed range.
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Setting name.
        field: &'static str,
        /// Supplied value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// An interval that must be non-zero was zero.
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}
