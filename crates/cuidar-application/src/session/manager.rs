use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use cuidar_core::account::{Account, NewAccount, login_timestamp};
use cuidar_core::auth::{AuthApi, LogoutRequest, RefreshRequest};
use cuidar_core::config::SessionConfig;
use cuidar_core::session::{RetryAction, Screen, UiError};
use cuidar_core::state::SessionStateRepository;
use cuidar_core::theme::{Theme, ThemeSurface};

use super::state::SessionState;

/// Message shown when a stored session can no longer be refreshed.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Owns the remembered accounts, the active-account pointer, the theme and
/// the session navigation stage.
///
/// `AccountSessionManager` is responsible for:
/// - Restoring state from the repository on startup
/// - Selecting accounts (refreshing their access token)
/// - Adding and removing accounts, including remote logout on removal
/// - Keeping the theme in sync with the active account and the surface
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct AccountSessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    repository: Arc<dyn SessionStateRepository>,
    auth: Arc<dyn AuthApi>,
    surface: Arc<dyn ThemeSurface>,
    config: SessionConfig,
    /// Never held across an await point.
    state: RwLock<SessionState>,
    /// Bumped by every selection; only the latest one may apply its result.
    select_generation: AtomicU64,
    /// Account targeted by the latest selection while its refresh is pending.
    selecting: Mutex<Option<String>>,
    /// Safety timers of in-flight removals, keyed by user id.
    pending_cleanups: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl AccountSessionManager {
    /// Restores the session from the repository and applies the resulting
    /// theme to the surface.
    ///
    /// Unreadable entries are logged and treated as absent. A pointer to an
    /// account that is not in the list is discarded.
    pub fn initialize(
        repository: Arc<dyn SessionStateRepository>,
        auth: Arc<dyn AuthApi>,
        surface: Arc<dyn ThemeSurface>,
        config: SessionConfig,
    ) -> Self {
        let accounts = repository.load_accounts().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "[Session] Failed to load accounts, starting empty");
            Vec::new()
        });

        let mut active_user_id = repository.get_active_user().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "[Session] Failed to read active user");
            None
        });
        if let Some(user_id) = active_user_id.as_deref()
            && !accounts.iter().any(|a| a.user_id == user_id)
        {
            tracing::warn!(user_id, "[Session] Discarding pointer to unknown account");
            if let Err(e) = repository.clear_active_user() {
                tracing::warn!(error = %e, "[Session] Failed to clear active user");
            }
            active_user_id = None;
        }

        let active_theme = active_user_id
            .as_deref()
            .and_then(|id| accounts.iter().find(|a| a.user_id == id))
            .map(|a| Theme::from_dark_mode(a.dark_mode));
        let theme = match active_theme {
            Some(theme) => theme,
            None => repository
                .get_theme()
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "[Session] Ignoring stored theme");
                    None
                })
                .unwrap_or_default(),
        };
        surface.set_dark(theme.is_dark());

        tracing::info!(
            accounts = accounts.len(),
            active_user = active_user_id.as_deref().unwrap_or(""),
            theme = %theme,
            "[Session] Restored"
        );

        Self {
            inner: Arc::new(Inner {
                repository,
                auth,
                surface,
                config,
                state: RwLock::new(SessionState::new(accounts, active_user_id, theme)),
                select_generation: AtomicU64::new(0),
                selecting: Mutex::new(None),
                pending_cleanups: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Stores a freshly authenticated account (replacing any entry with the
    /// same id) and then selects it.
    pub async fn add_account(&self, new_account: NewAccount, is_new: bool) {
        let account = new_account.into_account(login_timestamp());
        {
            let mut state = self.inner.state.write().await;
            let before = state.accounts.len();
            state.upsert(account.clone());
            self.inner.persist_accounts(&state);
            self.inner.after_list_change(&mut state, before);
        }
        tracing::info!(user_id = %account.user_id, is_new, "[Session] Account added");

        self.select_account(account, is_new).await;
    }

    /// Refreshes the account's access token and makes it the active one.
    ///
    /// On failure the account is evicted, the UI is sent to onboarding and a
    /// retryable error is raised. Results of superseded selections, and of
    /// selections whose account was removed meanwhile, are discarded.
    pub async fn select_account(&self, account: Account, is_new: bool) {
        self.select(account, is_new, false).await;
    }

    /// `reinsert` lets a retry restore an account evicted by a failed refresh.
    async fn select(&self, account: Account, is_new: bool, reinsert: bool) {
        let generation = {
            let mut target = self.inner.selection_target();
            *target = Some(account.user_id.clone());
            self.inner.select_generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        self.inner.state.write().await.loading = true;
        tracing::debug!(user_id = %account.user_id, is_new, generation, "[Session] Selecting account");

        let result = self
            .inner
            .auth
            .refresh(RefreshRequest::for_refresh_token(account.refresh.clone()))
            .await;

        let mut state = self.inner.state.write().await;
        let is_current = {
            let mut target = self.inner.selection_target();
            let is_current = self.inner.select_generation.load(Ordering::SeqCst) == generation;
            if is_current {
                target.take();
            }
            is_current
        };
        if !is_current {
            tracing::debug!(user_id = %account.user_id, generation, "[Session] Discarding superseded selection");
            return;
        }

        match result {
            Ok(response) => {
                let mut refreshed = match state.find(&account.user_id).cloned() {
                    Some(existing) => existing,
                    None if reinsert => account.clone(),
                    None => {
                        tracing::debug!(
                            user_id = %account.user_id,
                            "[Session] Account no longer stored, dropping selection"
                        );
                        state.loading = false;
                        return;
                    }
                };
                refreshed.access = response.access;
                refreshed.last_login = login_timestamp();

                let before = state.accounts.len();
                state.upsert(refreshed.clone());
                self.inner.persist_accounts(&state);

                state.active_user_id = Some(refreshed.user_id.clone());
                self.inner.persist_active_user(Some(&refreshed.user_id));
                self.inner
                    .apply_theme(&mut state, Theme::from_dark_mode(refreshed.dark_mode), false);
                self.inner.after_list_change(&mut state, before);

                state.error = UiError::hidden();
                state.loading = false;
                tracing::info!(user_id = %refreshed.user_id, is_new, "[Session] Account selected");
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %account.user_id,
                    error = %e,
                    "[Session] Token refresh failed, evicting account"
                );

                state.active_user_id = None;
                self.inner.persist_active_user(None);
                state.error = UiError::with_retry(
                    SESSION_EXPIRED_MESSAGE,
                    RetryAction::SelectAccount {
                        account: account.clone(),
                        is_new,
                    },
                );

                let before = state.accounts.len();
                if state.remove(&account.user_id).is_some() {
                    self.inner.persist_accounts(&state);
                }
                self.inner.after_list_change(&mut state, before);

                state.screen = Screen::Onboarding;
                state.loading = false;
            }
        }
    }

    /// Removes an account: remote logout bounded by the logout timeout,
    /// then local cleanup.
    ///
    /// Local cleanup always happens, whatever the remote outcome. A safety
    /// timer forces it if neither the call nor the timeout completes.
    pub async fn remove_account(&self, user_id: &str) {
        let refresh = {
            let mut state = self.inner.state.write().await;
            state.loading = true;
            state.find(user_id).map(|a| a.refresh.clone()).unwrap_or_default()
        };
        self.spawn_safety_cleanup(user_id);
        tracing::info!(user_id, "[Session] Removing account");

        let logout = self.inner.auth.logout(LogoutRequest { refresh });
        match tokio::time::timeout(self.inner.config.logout_timeout(), logout).await {
            Ok(Ok(())) => tracing::debug!(user_id, "[Session] Remote logout succeeded"),
            Ok(Err(e)) => {
                tracing::warn!(user_id, error = %e, "[Session] Remote logout failed, removing locally")
            }
            Err(_) => tracing::warn!(
                user_id,
                timeout_secs = self.inner.config.logout_timeout_secs,
                "[Session] Remote logout timed out, removing locally"
            ),
        }

        // Whoever takes the timer handle owns the cleanup.
        match self.inner.take_safety_timer(user_id) {
            Some(handle) => {
                handle.abort();
                self.inner.cleanup_removal(user_id).await;
            }
            None => tracing::debug!(user_id, "[Session] Removal already cleaned up"),
        }
    }

    fn spawn_safety_cleanup(&self, user_id: &str) {
        let inner = Arc::clone(&self.inner);
        let id = user_id.to_string();
        let delay = self.inner.config.safety_cleanup_delay();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.take_safety_timer(&id).is_some() {
                tracing::warn!(user_id = %id, "[Session] Safety timer forcing removal cleanup");
                inner.cleanup_removal(&id).await;
            }
        });

        if let Some(previous) = self.inner.pending_timers().insert(user_id.to_string(), handle) {
            previous.abort();
        }
    }

    /// Local logout: forgets the active pointer, keeps the account.
    ///
    /// No remote call is made; the refresh token stays valid server-side.
    pub async fn logout_current_account(&self) {
        let mut state = self.inner.state.write().await;
        let Some(user_id) = state.active_user_id.clone() else {
            tracing::debug!("[Session] Logout requested without an active session");
            return;
        };
        let has_refresh = state.find(&user_id).is_some_and(|a| !a.refresh.is_empty());

        state.active_user_id = None;
        self.inner.persist_active_user(None);
        state.screen = Screen::AccountSelection;
        tracing::info!(user_id = %user_id, has_refresh, "[Session] Logged out");
    }

    /// Marks an account for removal and shows the confirmation screen.
    pub async fn request_removal(&self, user_id: &str) {
        let mut state = self.inner.state.write().await;
        let Some(account) = state.find(user_id).cloned() else {
            tracing::warn!(user_id, "[Session] Removal requested for unknown account");
            return;
        };
        state.pending_removal = Some(account);
        state.screen = Screen::ConfirmLogout;
    }

    /// Dismisses the confirmation prompt without removing anything.
    pub async fn cancel_removal(&self) {
        let mut state = self.inner.state.write().await;
        state.pending_removal = None;
        state.screen = state.default_screen();
    }

    /// Removes the account awaiting confirmation, if any.
    pub async fn confirm_removal(&self) {
        let pending = self.inner.state.read().await.pending_removal.clone();
        match pending {
            Some(account) => self.remove_account(&account.user_id).await,
            None => tracing::debug!("[Session] No removal pending"),
        }
    }

    /// Sets the theme, mirroring it into the active account when present.
    pub async fn set_theme(&self, theme: Theme) {
        let mut state = self.inner.state.write().await;
        self.inner.apply_theme(&mut state, theme, true);
        tracing::info!(theme = %theme, "[Session] Theme set");
    }

    /// Flips the theme and returns the new value.
    pub async fn toggle_theme(&self) -> Theme {
        let mut state = self.inner.state.write().await;
        let theme = state.theme.toggled();
        self.inner.apply_theme(&mut state, theme, true);
        tracing::info!(theme = %theme, "[Session] Theme toggled");
        theme
    }

    pub async fn set_screen(&self, screen: Screen) {
        self.inner.state.write().await.screen = screen;
    }

    pub async fn dismiss_error(&self) {
        self.inner.state.write().await.error = UiError::hidden();
    }

    /// Replays the action attached to the current error, if any.
    pub async fn retry(&self) {
        let action = {
            let mut state = self.inner.state.write().await;
            let action = state.error.retry.take();
            state.error = UiError::hidden();
            action
        };

        match action {
            Some(RetryAction::SelectAccount { account, is_new }) => {
                tracing::info!(user_id = %account.user_id, "[Session] Retrying selection");
                self.select(account, is_new, true).await;
            }
            None => tracing::debug!("[Session] Nothing to retry"),
        }
    }

    /// Completes pending removals immediately and flushes state to the
    /// repository.
    pub async fn shutdown(&self) {
        let pending: Vec<(String, JoinHandle<()>)> = self.inner.pending_timers().drain().collect();
        for (user_id, handle) in pending {
            handle.abort();
            tracing::info!(user_id = %user_id, "[Session] Completing removal before shutdown");
            self.inner.cleanup_removal(&user_id).await;
        }

        let state = self.inner.state.read().await;
        self.inner.persist_accounts(&state);
        self.inner.persist_active_user(state.active_user_id.as_deref());
        if let Err(e) = self.inner.repository.set_theme(state.theme) {
            tracing::warn!(error = %e, "[Session] Failed to persist theme");
        }
        tracing::info!("[Session] Shut down");
    }

    pub async fn accounts(&self) -> Vec<Account> {
        self.inner.state.read().await.accounts.clone()
    }

    pub async fn active_account(&self) -> Option<Account> {
        self.inner.state.read().await.active_account().cloned()
    }

    pub async fn active_user_id(&self) -> Option<String> {
        self.inner.state.read().await.active_user_id.clone()
    }

    /// Access token of the active account, for authenticated requests.
    pub async fn active_access_token(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .await
            .active_account()
            .map(|a| a.access.clone())
    }

    pub async fn find_account(&self, user_id: &str) -> Option<Account> {
        self.inner.state.read().await.find(user_id).cloned()
    }

    pub async fn screen(&self) -> Screen {
        self.inner.state.read().await.screen
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.state.read().await.loading
    }

    pub async fn theme(&self) -> Theme {
        self.inner.state.read().await.theme
    }

    pub async fn pending_removal(&self) -> Option<Account> {
        self.inner.state.read().await.pending_removal.clone()
    }

    pub async fn error(&self) -> UiError {
        self.inner.state.read().await.error.clone()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.inner.state.read().await.clone()
    }
}

impl Inner {
    fn pending_timers(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.pending_cleanups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_safety_timer(&self, user_id: &str) -> Option<JoinHandle<()>> {
        self.pending_timers().remove(user_id)
    }

    fn selection_target(&self) -> MutexGuard<'_, Option<String>> {
        self.selecting
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Local half of a removal. Run by whichever of the main path, the
    /// safety timer or shutdown claims the timer handle.
    async fn cleanup_removal(&self, user_id: &str) {
        let mut state = self.state.write().await;
        state.loading = false;

        // A refresh still in flight for this account must not bring it back.
        {
            let mut target = self.selection_target();
            if target.as_deref() == Some(user_id) {
                target.take();
                self.select_generation.fetch_add(1, Ordering::SeqCst);
            }
        }

        if state.active_user_id.as_deref() == Some(user_id) {
            state.active_user_id = None;
            self.persist_active_user(None);
        }

        let before = state.accounts.len();
        if state.remove(user_id).is_some() {
            self.persist_accounts(&state);
            tracing::info!(user_id, "[Session] Account removed");
        }
        self.after_list_change(&mut state, before);

        state.pending_removal = None;
        if state.screen == Screen::ConfirmLogout {
            state.screen = state.default_screen();
        }
    }

    /// Navigation rule, evaluated whenever the account count changes.
    fn after_list_change(&self, state: &mut SessionState, previous_len: usize) {
        if state.accounts.len() == previous_len {
            return;
        }

        if state.accounts.is_empty() {
            state.screen = Screen::Onboarding;
            if state.active_user_id.take().is_some() {
                self.persist_active_user(None);
            }
            self.apply_theme(state, Theme::Light, false);
        } else if state.active_user_id.is_none() {
            state.screen = Screen::AccountSelection;
        }
    }

    /// Updates the in-memory theme, the global fallback and the surface.
    /// With `mirror`, the active account's preference follows.
    fn apply_theme(&self, state: &mut SessionState, theme: Theme, mirror: bool) {
        state.theme = theme;
        if let Err(e) = self.repository.set_theme(theme) {
            tracing::warn!(error = %e, "[Session] Failed to persist theme");
        }
        self.surface.set_dark(theme.is_dark());

        if !mirror {
            return;
        }
        let Some(user_id) = state.active_user_id.clone() else {
            return;
        };
        if let Some(account) = state.find_mut(&user_id) {
            account.dark_mode = theme.is_dark();
            self.persist_accounts(state);
        }
    }

    fn persist_accounts(&self, state: &SessionState) {
        if let Err(e) = self.repository.save_accounts(&state.accounts) {
            tracing::warn!(error = %e, "[Session] Failed to persist accounts");
        }
    }

    fn persist_active_user(&self, user_id: Option<&str>) {
        let result = match user_id {
            Some(id) => self.repository.set_active_user(id),
            None => self.repository.clear_active_user(),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "[Session] Failed to persist active user");
        }
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
