pub mod account;
pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;
pub mod theme;

// Re-export common error type
pub use error::CuidarError;
