//! Session state repository trait.

use crate::account::Account;
use crate::error::Result;
use crate::theme::Theme;

/// Repository for the account list, the active-account pointer and the
/// global theme fallback.
///
/// The three entries are stored independently so that "no one is logged in"
/// is representable while accounts exist locally.
pub trait SessionStateRepository: Send + Sync {
    /// Loads the stored account list, migrating older schema versions.
    ///
    /// A missing entry yields an empty list; malformed data is an error.
    fn load_accounts(&self) -> Result<Vec<Account>>;

    /// Saves the account list. An empty list removes the entry entirely.
    fn save_accounts(&self, accounts: &[Account]) -> Result<()>;

    fn get_active_user(&self) -> Result<Option<String>>;

    fn set_active_user(&self, user_id: &str) -> Result<()>;

    fn clear_active_user(&self) -> Result<()>;

    /// Global theme fallback used when no account is active.
    fn get_theme(&self) -> Result<Option<Theme>>;

    fn set_theme(&self, theme: Theme) -> Result<()>;
}
