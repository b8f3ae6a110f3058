//! Atomic file writes and cross-process file locking.
//!
//! Shared by the TOML config file and the JSON key-value store:
//! - **Atomicity**: writes go to a sibling tmp file and are renamed into place
//! - **Durability**: explicit fsync before rename
//! - **Isolation**: an exclusive lock file serialises read-modify-write cycles

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use cuidar_core::error::{CuidarError, Result};

/// Writes `contents` to `path` via tmp file + fsync + rename.
///
/// Creates the parent directory when missing.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(contents)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Reads the file, returning `None` when it is missing or blank.
pub fn read_if_present(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(content))
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| CuidarError::io(format!("Path has no file name: {}", path.display())))?;
    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

/// An exclusive lock on `<path>.lock`, released when the handle closes.
///
/// The lock file stays on disk; deleting it would let two processes lock
/// different inodes at once.
pub struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    /// Acquires an exclusive lock next to `path` (`<path>.lock`), blocking until available.
    pub fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| CuidarError::io(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file })
    }
}
