//! Account session services.
//!
//! The manager coordinates the state repository, the auth API and the theme
//! surface; [`SessionState`] is the in-memory view it exposes.

mod manager;
mod state;

pub use manager::{AccountSessionManager, SESSION_EXPIRED_MESSAGE};
pub use state::SessionState;
