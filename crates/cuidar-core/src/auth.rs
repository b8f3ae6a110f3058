//! Remote authentication API seam.
//!
//! The API is consumed, not implemented, by this workspace. Only the two
//! endpoints the session manager needs are modelled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Token refresh request body. `access` is sent empty; only `refresh` matters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshRequest {
    pub access: String,
    pub refresh: String,
}

impl RefreshRequest {
    pub fn for_refresh_token(refresh: impl Into<String>) -> Self {
        Self {
            access: String::new(),
            refresh: refresh.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogoutRequest {
    pub refresh: String,
}

/// Token refresh and logout endpoints of the auth backend.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Mints a new access token. Fails when the refresh token is expired or invalid.
    async fn refresh(&self, request: RefreshRequest) -> Result<RefreshResponse>;

    /// Invalidates the refresh token server-side.
    async fn logout(&self, request: LogoutRequest) -> Result<()>;
}
