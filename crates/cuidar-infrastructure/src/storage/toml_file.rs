//! Atomic TOML file handle.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use cuidar_core::error::Result;

use super::atomic::{FileLock, read_if_present, write_atomic};

/// A typed TOML file written with tmp-file + rename and guarded by a lock file.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// - `Ok(Some(T))`: loaded
    /// - `Ok(None)`: file missing or empty
    /// - `Err`: unreadable or not valid TOML for `T`
    pub fn load(&self) -> Result<Option<T>> {
        match read_if_present(&self.path)? {
            Some(content) => Ok(Some(toml::from_str(&content)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, data: &T) -> Result<()> {
        let toml_string = toml::to_string_pretty(data)?;
        write_atomic(&self.path, toml_string.as_bytes())
    }

    /// Loads the file, or writes `default_value` and returns it when the file is missing.
    pub fn load_or_init(&self, default_value: T) -> Result<T> {
        let _lock = FileLock::acquire(&self.path)?;
        if let Some(existing) = self.load()? {
            return Ok(existing);
        }
        self.save(&default_value)?;
        Ok(default_value)
    }
}
