//! File-backed key-value store for values that must survive restarts.
//!
//! All keys live in one JSON object file inside the state directory. Every
//! mutation rewrites the file atomically.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use super::atomic_io::write_atomic;
use crate::domain::ports::{KeyValueStore, StorageError};

const STORE_FILE: &str = "durable.json";

type Entries = BTreeMap<String, String>;

/// Durable store persisted as `durable.json` in a state directory.
#[derive(Debug)]
pub struct FileStore {
    dir: Dir,
    mutation: Mutex<()>,
}

impl FileStore {
    /// Open (creating if needed) the state directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] when the directory cannot be created
    /// or [`StorageError::Read`] when it cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority()).map_err(|err| {
            StorageError::write(format!("create state directory '{}': {err}", path.display()))
        })?;
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(|err| {
            StorageError::read(format!("open state directory '{}': {err}", path.display()))
        })?;
        Ok(Self {
            dir,
            mutation: Mutex::new(()),
        })
    }

    fn load(&self) -> Result<Entries, StorageError> {
        match self.dir.read_to_string(STORE_FILE) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|err| StorageError::corrupt(format!("{STORE_FILE}: {err}"))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(err) => Err(StorageError::read(format!("{STORE_FILE}: {err}"))),
        }
    }

    fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|err| StorageError::write(format!("encode {STORE_FILE}: {err}")))?;
        write_atomic(&self.dir, STORE_FILE, &contents)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StorageError> {
        self.mutation
            .lock()
            .map_err(|e| StorageError::write(format!("lock poisoned: {e}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock()?;
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)?;
        debug!(key, "durable value written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock()?;
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
            debug!(key, "durable value removed");
        }
        Ok(())
    }
}
