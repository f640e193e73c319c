//! Error types for protocol operations.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while building or decoding inventory data.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A slot vector did not have exactly the inventory size.
    #[error("expected {expected} slots, got {actual}")]
    SlotCount {
        /// Required number of slots.
        expected: usize,
        /// Number of slots supplied.
        actual: usize,
    },

    /// A slot index was outside the inventory.
    #[error("slot index {0} out of range")]
    SlotIndex(usize),

    /// The record was written by an unknown format revision.
    #[error("unsupported record format {found} (expected {expected})")]
    UnsupportedFormat {
        /// Format revision this build understands.
        expected: u16,
        /// Format revision found in the record.
        found: u16,
    },

    /// CBOR encoding failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// CBOR decoding failed.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ProtocolError {
    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates an encode error.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }
}
