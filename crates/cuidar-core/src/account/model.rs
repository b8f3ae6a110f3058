//! Account domain models.
//!
//! An [`Account`] is one locally remembered login: profile, credentials,
//! per-account theme preference, and bookkeeping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CuidarError;

/// Format used for the human-readable `last_login` stamp (day-first, local time).
pub const LAST_LOGIN_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Returns the current local time formatted for `Account::last_login`.
pub fn login_timestamp() -> String {
    chrono::Local::now().format(LAST_LOGIN_FORMAT).to_string()
}

/// Role tag assigned to an account by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Health worker (ACS) account.
    #[serde(alias = "acs")]
    Provider,
    /// Patient account.
    Person,
    /// Registered but not yet assigned a role.
    #[default]
    #[serde(rename = "none")]
    Unassigned,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Provider => "provider",
            Role::Person => "person",
            Role::Unassigned => "none",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CuidarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "provider" | "acs" => Ok(Role::Provider),
            "person" => Ok(Role::Person),
            "none" => Ok(Role::Unassigned),
            other => Err(CuidarError::InvalidValue(format!("unknown role '{}'", other))),
        }
    }
}

/// One locally remembered login.
///
/// `user_id` is unique within the stored account list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Opaque identifier assigned by the backend.
    pub user_id: String,
    pub name: String,
    pub email: String,
    /// Profile picture reference (URL or asset key).
    pub picture: Option<String>,
    /// Alternate/social display name.
    pub social_name: Option<String>,
    /// Short-lived token used to authorize API requests.
    pub access: String,
    /// Long-lived token used to mint new access tokens.
    pub refresh: String,
    /// Per-account theme preference.
    pub dark_mode: bool,
    /// Locale-formatted time of the last successful selection.
    pub last_login: String,
    pub role: Role,
}

impl Account {
    /// Name shown in account pickers: the social name when set, else the registered name.
    pub fn display_name(&self) -> &str {
        self.social_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// Input for adding an account: every [`Account`] field except `last_login`,
/// which is stamped when the account is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub social_name: Option<String>,
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub role: Role,
}

impl NewAccount {
    /// Builds the stored account, stamping `last_login`.
    pub fn into_account(self, last_login: String) -> Account {
        Account {
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            picture: self.picture,
            social_name: self.social_name,
            access: self.access,
            refresh: self.refresh,
            dark_mode: self.dark_mode,
            last_login,
            role: self.role,
        }
    }
}

/// The persisted account list.
///
/// Wraps the list so the stored document can carry a schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AccountBook {
    pub accounts: Vec<Account>,
}

impl AccountBook {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }
}
