use cuidar_core::account::Account;
use cuidar_core::session::{Screen, UiError};
use cuidar_core::theme::Theme;

/// In-memory view of the account session, owned by [`AccountSessionManager`].
///
/// [`AccountSessionManager`]: super::AccountSessionManager
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Known accounts in insertion order, unique by `user_id`.
    pub accounts: Vec<Account>,
    pub active_user_id: Option<String>,
    pub screen: Screen,
    pub loading: bool,
    pub theme: Theme,
    /// Account awaiting removal confirmation.
    pub pending_removal: Option<Account>,
    pub error: UiError,
}

impl SessionState {
    pub fn new(accounts: Vec<Account>, active_user_id: Option<String>, theme: Theme) -> Self {
        let screen = Self::resting_screen(&accounts);
        Self {
            accounts,
            active_user_id,
            screen,
            loading: false,
            theme,
            pending_removal: None,
            error: UiError::hidden(),
        }
    }

    /// Screen shown when nothing else is in progress.
    fn resting_screen(accounts: &[Account]) -> Screen {
        if accounts.is_empty() {
            Screen::Onboarding
        } else {
            Screen::AccountSelection
        }
    }

    pub fn default_screen(&self) -> Screen {
        Self::resting_screen(&self.accounts)
    }

    pub fn find(&self, user_id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.user_id == user_id)
    }

    pub fn find_mut(&mut self, user_id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.user_id == user_id)
    }

    pub fn active_account(&self) -> Option<&Account> {
        self.active_user_id.as_deref().and_then(|id| self.find(id))
    }

    /// Replaces the entry with the same `user_id` in place, or appends.
    ///
    /// Returns `true` when the account was appended.
    pub fn upsert(&mut self, account: Account) -> bool {
        match self.find_mut(&account.user_id) {
            Some(existing) => {
                *existing = account;
                false
            }
            None => {
                self.accounts.push(account);
                true
            }
        }
    }

    pub fn remove(&mut self, user_id: &str) -> Option<Account> {
        let index = self.accounts.iter().position(|a| a.user_id == user_id)?;
        Some(self.accounts.remove(index))
    }
}
