//! Unified path management for cuidar files.
//!
//! Paths are resolved via `AppPaths` from the version-migrate crate so they
//! follow platform conventions (XDG on Linux, appropriate dirs elsewhere).
//!
//! ```text
//! ~/.config/cuidar/
//! └── config.toml        # RootConfig
//!
//! ~/.local/share/cuidar/
//! └── session.json       # key-value store (accounts, activeUser, theme)
//! ```

use std::path::{Path, PathBuf};

use version_migrate::AppPaths;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for cuidar_core::CuidarError {
    fn from(err: PathError) -> Self {
        cuidar_core::CuidarError::config(err.to_string())
    }
}

/// Files the workspace persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Config,
    SessionStore,
}

impl ServiceType {
    fn file_name(self) -> &'static str {
        match self {
            ServiceType::Config => "config.toml",
            ServiceType::SessionStore => "session.json",
        }
    }
}

/// Path resolver. A base override puts every file under one directory
/// (used by tests and `--store`/`--config` style overrides).
pub struct CuidarPaths {
    base: Option<PathBuf>,
}

impl CuidarPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    fn app_paths() -> AppPaths {
        AppPaths::new("cuidar")
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => Self::app_paths()
                .config_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => Self::app_paths()
                .data_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    pub fn get_path(&self, service: ServiceType) -> Result<PathBuf, PathError> {
        let dir = match service {
            ServiceType::Config => self.config_dir()?,
            ServiceType::SessionStore => self.data_dir()?,
        };
        Ok(dir.join(service.file_name()))
    }
}
