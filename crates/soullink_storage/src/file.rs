//! File-based record store for persistent save data.
//!
//! Layout of a save directory:
//!
//! ```text
//! <save_dir>/
//! ├─ LOCK                              # Advisory lock for single-writer
//! ├─ soullink_shared_inventory.dat     # One file per record
//! └─ soullink_shared_inventory.dat.tmp # Transient, during a write
//! ```

use crate::error::{StorageError, StorageResult};
use crate::store::{validate_record_name, RecordStore};
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const RECORD_EXT: &str = "dat";
const TEMP_SUFFIX: &str = ".tmp";

/// A record store keeping one file per record in a save directory.
///
/// # Durability
///
/// Writes go to a temporary file that is synced and then renamed over the
/// record, so a crash mid-write leaves the previous record intact.
///
/// # Thread Safety
///
/// The store holds an exclusive advisory lock on the directory, so only one
/// process may use it at a time. Writes within the process are serialized.
///
/// # Example
///
/// ```no_run
/// use soullink_storage::{RecordStore, FileStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("world/soullink")).unwrap();
/// store.write("soullink_shared_inventory", b"record bytes").unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
    _lock_file: File,
}

impl FileStore {
    /// Opens or creates a save directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another process holds the
    /// directory, or an I/O error if it cannot be created or opened.
    pub fn open(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root)?;
        if !root.is_dir() {
            return Err(StorageError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("not a directory: {}", root.display()),
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(root.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        Ok(Self {
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
            _lock_file: lock_file,
        })
    }

    /// Returns the save directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Returns the file path of a record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidName`] for an unusable record name.
    pub fn record_path(&self, name: &str) -> StorageResult<PathBuf> {
        validate_record_name(name)?;
        Ok(self.root.join(format!("{name}.{RECORD_EXT}")))
    }
}

impl RecordStore for FileStore {
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.record_path(name)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.record_path(name)?;
        let mut temp_name = path.clone().into_os_string();
        temp_name.push(TEMP_SUFFIX);
        let temp_path = PathBuf::from(temp_name);

        let _guard = self.write_lock.lock();
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(data)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        let path = self.record_path(name)?;
        let _guard = self.write_lock.lock();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn names(&self) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
