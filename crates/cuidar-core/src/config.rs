use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long a remote logout may take before removal proceeds without it.
pub const DEFAULT_LOGOUT_TIMEOUT_SECS: u64 = 8;
/// Delay after which the safety task forces local removal cleanup.
pub const DEFAULT_SAFETY_CLEANUP_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/token/refresh/";
pub const DEFAULT_LOGOUT_PATH: &str = "/auth/logout/";

/// Root configuration (`config.toml`).
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct RootConfig {
    #[serde(default)]
    pub session: SessionConfig,
}

/// Settings for the account/session manager and its auth API client.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_logout_timeout_secs")]
    pub logout_timeout_secs: u64,
    #[serde(default = "default_safety_cleanup_secs")]
    pub safety_cleanup_secs: u64,
    /// Overrides the location of the key-value store file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_logout_path() -> String {
    DEFAULT_LOGOUT_PATH.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_logout_timeout_secs() -> u64 {
    DEFAULT_LOGOUT_TIMEOUT_SECS
}

fn default_safety_cleanup_secs() -> u64 {
    DEFAULT_SAFETY_CLEANUP_SECS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            refresh_path: default_refresh_path(),
            logout_path: default_logout_path(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            logout_timeout_secs: DEFAULT_LOGOUT_TIMEOUT_SECS,
            safety_cleanup_secs: DEFAULT_SAFETY_CLEANUP_SECS,
            store_path: None,
        }
    }
}

impl SessionConfig {
    pub fn logout_timeout(&self) -> Duration {
        Duration::from_secs(self.logout_timeout_secs)
    }

    pub fn safety_cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.safety_cleanup_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Joins the base URL and an endpoint path without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
