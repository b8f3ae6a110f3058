use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use cuidar_application::AccountSessionManager;
use cuidar_infrastructure::paths::{CuidarPaths, ServiceType};
use cuidar_infrastructure::{
    ConfigService, HttpAuthApi, JsonFileStore, KeyValueStateRepository, TracingSurface,
};

/// Wires config, store, auth client and surface into a session manager.
pub fn build_manager(
    config_path: Option<PathBuf>,
    store_path: Option<PathBuf>,
) -> Result<AccountSessionManager> {
    let config_service = match config_path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    let session = config_service.session_config();

    let store_path = match store_path.or_else(|| session.store_path.clone()) {
        Some(path) => path,
        None => CuidarPaths::new(None).get_path(ServiceType::SessionStore)?,
    };
    tracing::debug!(store = %store_path.display(), api = %session.api_base_url, "Composing session manager");

    let store = Arc::new(JsonFileStore::new(store_path));
    let repository = Arc::new(KeyValueStateRepository::new(store));
    let auth = Arc::new(HttpAuthApi::new(&session).context("Failed to create auth client")?);
    let surface = Arc::new(TracingSurface::new());

    Ok(AccountSessionManager::initialize(repository, auth, surface, session))
}
