//! Key-value store persisted as a single JSON object file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cuidar_core::error::{CuidarError, Result};
use cuidar_core::storage::KeyValueStore;

use super::atomic::{FileLock, read_if_present, write_atomic};

/// Durable key-value store backed by one JSON file (`{"key": "value", ...}`).
///
/// Every write is a locked read-modify-write cycle followed by an atomic
/// rename, so concurrent writers never lose each other's keys.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        match read_if_present(&self.path)? {
            Some(content) => serde_json::from_str(&content).map_err(|e| {
                CuidarError::Serialization {
                    format: "JSON".to_string(),
                    message: format!("store file '{}': {}", self.path.display(), e),
                }
            }),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Runs `f` over the current entries under the lock and writes the result back.
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) if e.is_serialization() => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Store file is corrupt, starting from an empty store"
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        f(&mut entries);

        let json = serde_json::to_string_pretty(&entries)?;
        write_atomic(&self.path, json.as_bytes())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
