//! CLI command implementations.

pub mod check_config;
pub mod inspect;
pub mod reset;
pub mod transfer;

use soullink_storage::{FileStore, StorageError};
use soullink_sync_engine::PersistenceAdapter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// No record with this name exists yet.
    #[error("no record '{record}' in {path:?}")]
    MissingRecord {
        /// Record name.
        record: String,
        /// Save directory.
        path: PathBuf,
    },

    /// A running server holds the save directory.
    #[error("{0:?} is in use by a running server")]
    InUse(PathBuf),

    /// The command refused to run without confirmation.
    #[error("{0}")]
    Refused(String),
}

/// Opens the save directory and wraps the shared inventory record.
pub fn open(path: &Path, record: &str) -> Result<PersistenceAdapter<FileStore>, Box<dyn std::error::Error>> {
    let store = match FileStore::open(path) {
        Ok(store) => store,
        Err(StorageError::Locked) => return Err(CliError::InUse(path.to_path_buf()).into()),
        Err(e) => return Err(e.into()),
    };
    Ok(PersistenceAdapter::new(Arc::new(store), record, 1))
}
