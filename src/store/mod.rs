//! Persistence of the period history
//!
//! The core only sees a [`PersistenceGateway`], which reads and writes one
//! named blob through any [`KeyValueStore`]. Two stores ship with the crate:
//! [`MemoryStore`] for tests and embedding, and [`FileStore`], which keeps one
//! file per key in a data directory.

mod gateway;
mod migrate;

pub use gateway::{decode_history, encode_history, LoadStatus, PersistenceGateway};
pub use migrate::{
    convert_legacy, migrate_legacy, read_legacy, LegacyRecord, LEGACY_PERIOD_LENGTH,
};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};

/// Key of the current-format history blob
pub const RECORDS_KEY: &str = "period_records";

/// Key of the legacy start-date-only blob
pub const LEGACY_RECORDS_KEY: &str = "periodRecords";

/// A generic byte store addressed by string keys.
pub trait KeyValueStore {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` holds a blob
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Directory-backed store: one `<key>.blob` file per key.
///
/// Writes go to a temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the store configured in `config`, creating its directory if needed.
    pub fn open(config: &Config) -> Result<Self> {
        Self::at(config.storage_path()?)
    }

    /// Open a store rooted at `dir`, creating it if needed.
    pub fn at(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the blobs
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::other(format!("invalid store key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.blob")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.key_path(key)?;
        let temp = path.with_extension("blob.tmp");
        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }
}
