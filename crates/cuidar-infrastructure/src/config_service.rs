//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml`, writing defaults on
//! first run, then applies environment overrides.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use cuidar_core::config::{RootConfig, SessionConfig};
use cuidar_core::error::Result;

use crate::paths::{CuidarPaths, ServiceType};
use crate::storage::AtomicTomlFile;

/// Environment variable overriding `session.api_base_url`.
pub const API_URL_ENV: &str = "CUIDAR_API_URL";

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration, loaded lazily on first access.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Uses the platform config path (`~/.config/cuidar/config.toml`).
    pub fn new() -> Result<Self> {
        let path = CuidarPaths::new(None).get_path(ServiceType::Config)?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// An unreadable file falls back to defaults.
    pub fn get_config(&self) -> RootConfig {
        if let Ok(read_lock) = self.config.read() {
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let mut loaded = self.load_config().unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Falling back to default config");
            RootConfig::default()
        });
        apply_env_overrides(&mut loaded.session, std::env::var(API_URL_ENV).ok());

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    pub fn session_config(&self) -> SessionConfig {
        self.get_config().session
    }

    fn load_config(&self) -> Result<RootConfig> {
        AtomicTomlFile::<RootConfig>::new(self.path.clone()).load_or_init(RootConfig::default())
    }
}

fn apply_env_overrides(session: &mut SessionConfig, api_url: Option<String>) {
    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
        tracing::debug!(url = %url, "Using API base URL from environment");
        session.api_base_url = url;
    }
}
