//! Storage layer: atomic file operations and key-value store implementations.

mod atomic;
mod json_file_store;
mod memory_store;
mod toml_file;

pub use atomic::{FileLock, read_if_present, write_atomic};
pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use toml_file::AtomicTomlFile;
