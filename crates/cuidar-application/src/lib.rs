//! Application layer for cuidar.
//!
//! This crate coordinates the domain traits from `cuidar-core` into the
//! account session use cases: restoring, selecting, adding and removing
//! accounts, local logout and theme handling.

pub mod session;

pub use session::{AccountSessionManager, SessionState};
