pub mod auth_client;
pub mod config_service;
pub mod dto;
pub mod paths;
pub mod state_repository;
pub mod storage;
pub mod surface;

pub use crate::auth_client::HttpAuthApi;
pub use crate::config_service::ConfigService;
pub use crate::state_repository::KeyValueStateRepository;
pub use crate::storage::{JsonFileStore, MemoryStore};
pub use crate::surface::TracingSurface;
