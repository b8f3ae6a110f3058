//! Session state repository backed by a key-value store.
//!
//! Three independent entries:
//! - `activeUser`: the active account id
//! - `accounts`: the versioned account book document
//! - `theme`: `"light"` or `"dark"`

use std::sync::Arc;

use cuidar_core::account::{Account, AccountBook};
use cuidar_core::error::{CuidarError, Result};
use cuidar_core::state::SessionStateRepository;
use cuidar_core::storage::KeyValueStore;
use cuidar_core::theme::Theme;

use crate::dto::{ACCOUNT_BOOK_ENTITY, create_account_book_migrator, normalize_legacy_account_list};

pub const ACTIVE_USER_KEY: &str = "activeUser";
pub const ACCOUNTS_KEY: &str = "accounts";
pub const THEME_KEY: &str = "theme";

/// [`SessionStateRepository`] over any [`KeyValueStore`].
pub struct KeyValueStateRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KeyValueStateRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl SessionStateRepository for KeyValueStateRepository {
    fn load_accounts(&self) -> Result<Vec<Account>> {
        let Some(raw) = self.store.get(ACCOUNTS_KEY)? else {
            return Ok(Vec::new());
        };

        let json_value: serde_json::Value = serde_json::from_str(&raw)?;
        let migrator = create_account_book_migrator();
        let book: AccountBook = migrator
            .load_flat_from(ACCOUNT_BOOK_ENTITY, normalize_legacy_account_list(json_value))
            .map_err(|e| CuidarError::Migration(format!("Failed to migrate account list: {}", e)))?;

        Ok(book.accounts)
    }

    fn save_accounts(&self, accounts: &[Account]) -> Result<()> {
        if accounts.is_empty() {
            return self.store.remove(ACCOUNTS_KEY);
        }

        let book = AccountBook::new(accounts.to_vec());
        let migrator = create_account_book_migrator();
        let serialized = migrator
            .save_domain_flat(ACCOUNT_BOOK_ENTITY, &book)
            .map_err(|e| CuidarError::Serialization {
                format: "JSON".to_string(),
                message: format!("Failed to serialize account list: {}", e),
            })?;

        self.store.set(ACCOUNTS_KEY, &serialized)
    }

    fn get_active_user(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(ACTIVE_USER_KEY)?
            .filter(|id| !id.trim().is_empty()))
    }

    fn set_active_user(&self, user_id: &str) -> Result<()> {
        self.store.set(ACTIVE_USER_KEY, user_id)
    }

    fn clear_active_user(&self) -> Result<()> {
        self.store.remove(ACTIVE_USER_KEY)
    }

    fn get_theme(&self) -> Result<Option<Theme>> {
        self.store
            .get(THEME_KEY)?
            .map(|raw| raw.parse::<Theme>())
            .transpose()
    }

    fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())
    }
}
