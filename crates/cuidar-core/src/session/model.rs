//! Session-level UI state models: navigation stage and the transient error slot.

use serde::{Deserialize, Serialize};

use crate::account::Account;

/// Navigation stage driven by the account/session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    AccountSelection,
    /// Confirmation prompt for a pending account removal.
    ConfirmLogout,
    Onboarding,
}

/// Action replayed when the user retries a failed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryAction {
    SelectAccount { account: Account, is_new: bool },
}

/// The single shared error slot displayed by the surrounding UI shell.
///
/// Cleared explicitly or superseded by the next error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiError {
    pub visible: bool,
    pub message: String,
    pub retry: Option<RetryAction>,
}

impl UiError {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn with_retry(message: impl Into<String>, retry: RetryAction) -> Self {
        Self {
            visible: true,
            message: message.into(),
            retry: Some(retry),
        }
    }
}
