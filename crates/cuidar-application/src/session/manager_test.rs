use super::*;
use async_trait::async_trait;
use cuidar_core::account::Role;
use cuidar_core::auth::RefreshResponse;
use cuidar_core::error::{CuidarError, Result};
use cuidar_infrastructure::state_repository::ACCOUNTS_KEY;
use cuidar_infrastructure::{KeyValueStateRepository, MemoryStore};
use std::collections::HashSet;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

#[derive(Clone, Copy)]
enum LogoutBehavior {
    Succeed,
    Fail,
    Hang,
}

// Mock AuthApi: refresh mints "fresh-<refresh token>" unless the token is
// marked as failing.
struct MockAuthApi {
    failing_tokens: Mutex<HashSet<String>>,
    refresh_delays: HashMap<String, Duration>,
    logout_behavior: LogoutBehavior,
    refresh_calls: AtomicUsize,
    logout_calls: Mutex<Vec<String>>,
}

impl MockAuthApi {
    fn new(logout_behavior: LogoutBehavior) -> Self {
        Self {
            failing_tokens: Mutex::new(HashSet::new()),
            refresh_delays: HashMap::new(),
            logout_behavior,
            refresh_calls: AtomicUsize::new(0),
            logout_calls: Mutex::new(Vec::new()),
        }
    }

    fn with_delay(mut self, refresh: &str, delay: Duration) -> Self {
        self.refresh_delays.insert(refresh.to_string(), delay);
        self
    }

    fn fail_refresh(&self, refresh: &str) {
        self.failing_tokens.lock().unwrap().insert(refresh.to_string());
    }

    fn allow_refresh(&self, refresh: &str) {
        self.failing_tokens.lock().unwrap().remove(refresh);
    }

    fn logout_calls(&self) -> Vec<String> {
        self.logout_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn refresh(&self, request: RefreshRequest) -> Result<RefreshResponse> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.refresh_delays.get(&request.refresh) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_tokens.lock().unwrap().contains(&request.refresh) {
            return Err(CuidarError::auth("token is invalid or expired"));
        }
        Ok(RefreshResponse {
            access: format!("fresh-{}", request.refresh),
        })
    }

    async fn logout(&self, request: LogoutRequest) -> Result<()> {
        self.logout_calls.lock().unwrap().push(request.refresh);
        match self.logout_behavior {
            LogoutBehavior::Succeed => Ok(()),
            LogoutBehavior::Fail => Err(CuidarError::Network("connection reset".to_string())),
            LogoutBehavior::Hang => std::future::pending().await,
        }
    }
}

#[derive(Default)]
struct RecordingSurface {
    calls: Mutex<Vec<bool>>,
}

impl RecordingSurface {
    fn last(&self) -> Option<bool> {
        self.calls.lock().unwrap().last().copied()
    }
}

impl ThemeSurface for RecordingSurface {
    fn set_dark(&self, dark: bool) {
        self.calls.lock().unwrap().push(dark);
    }
}

struct Harness {
    manager: AccountSessionManager,
    store: Arc<MemoryStore>,
    repo: Arc<KeyValueStateRepository>,
    auth: Arc<MockAuthApi>,
    surface: Arc<RecordingSurface>,
}

fn seeded_repo() -> (Arc<MemoryStore>, Arc<KeyValueStateRepository>) {
    let store = Arc::new(MemoryStore::new());
    let repo = Arc::new(KeyValueStateRepository::new(store.clone()));
    (store, repo)
}

fn start(store: Arc<MemoryStore>, repo: Arc<KeyValueStateRepository>, auth: MockAuthApi) -> Harness {
    let auth = Arc::new(auth);
    let surface = Arc::new(RecordingSurface::default());
    let manager = AccountSessionManager::initialize(
        repo.clone(),
        auth.clone(),
        surface.clone(),
        SessionConfig::default(),
    );
    Harness {
        manager,
        store,
        repo,
        auth,
        surface,
    }
}

fn new_account(user_id: &str, dark_mode: bool) -> NewAccount {
    NewAccount {
        user_id: user_id.to_string(),
        name: format!("User {}", user_id),
        email: format!("{}@example.org", user_id),
        picture: None,
        social_name: None,
        access: format!("a-{}", user_id),
        refresh: format!("r-{}", user_id),
        dark_mode,
        role: Role::Person,
    }
}

fn stored_account(user_id: &str, dark_mode: bool) -> Account {
    new_account(user_id, dark_mode).into_account("01/02/2024 09:30:00".to_string())
}

fn ids(accounts: &[Account]) -> Vec<&str> {
    accounts.iter().map(|a| a.user_id.as_str()).collect()
}

#[tokio::test]
async fn test_initialize_empty_store() {
    let (store, repo) = seeded_repo();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    let state = h.manager.snapshot().await;
    assert!(state.accounts.is_empty());
    assert_eq!(state.active_user_id, None);
    assert_eq!(state.screen, Screen::Onboarding);
    assert_eq!(state.theme, Theme::Light);
    assert!(!state.loading);
    assert_eq!(h.surface.last(), Some(false));
}

#[tokio::test]
async fn test_initialize_uses_active_account_theme() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false), stored_account("2", true)])
        .unwrap();
    repo.set_active_user("2").unwrap();
    repo.set_theme(Theme::Light).unwrap();

    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    assert_eq!(h.manager.active_user_id().await.as_deref(), Some("2"));
    assert_eq!(h.manager.theme().await, Theme::Dark);
    assert_eq!(h.manager.screen().await, Screen::AccountSelection);
    assert_eq!(h.surface.last(), Some(true));
}

#[tokio::test]
async fn test_initialize_falls_back_to_global_theme() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false)]).unwrap();
    repo.set_theme(Theme::Dark).unwrap();

    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    assert_eq!(h.manager.active_user_id().await, None);
    assert_eq!(h.manager.theme().await, Theme::Dark);
    assert_eq!(h.surface.last(), Some(true));
}

#[tokio::test]
async fn test_initialize_discards_dangling_pointer() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false)]).unwrap();
    repo.set_active_user("ghost").unwrap();

    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    assert_eq!(h.manager.active_user_id().await, None);
    assert_eq!(h.repo.get_active_user().unwrap(), None);
}

#[tokio::test]
async fn test_add_account_selects_and_persists() {
    let (store, repo) = seeded_repo();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.add_account(new_account("1", true), true).await;

    let active = h.manager.active_account().await.unwrap();
    assert_eq!(active.user_id, "1");
    assert_eq!(active.access, "fresh-r-1");
    assert_eq!(h.manager.active_access_token().await.as_deref(), Some("fresh-r-1"));
    assert!(!h.manager.is_loading().await);
    assert_eq!(h.manager.theme().await, Theme::Dark);
    assert_eq!(h.surface.last(), Some(true));

    let persisted = h.repo.load_accounts().unwrap();
    assert_eq!(ids(&persisted), vec!["1"]);
    assert_eq!(persisted[0].access, "fresh-r-1");
    assert_eq!(h.repo.get_active_user().unwrap().as_deref(), Some("1"));
}

#[tokio::test]
async fn test_add_account_replaces_same_user_in_place() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false), stored_account("2", false)])
        .unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    let mut updated = new_account("1", false);
    updated.name = "Renamed".to_string();
    h.manager.add_account(updated, false).await;

    let accounts = h.manager.accounts().await;
    assert_eq!(ids(&accounts), vec!["1", "2"]);
    assert_eq!(accounts[0].name, "Renamed");
}

#[tokio::test]
async fn test_select_failure_evicts_account() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false), stored_account("2", false)])
        .unwrap();
    let auth = MockAuthApi::new(LogoutBehavior::Succeed);
    auth.fail_refresh("r-2");
    let h = start(store, repo, auth);

    h.manager.select_account(stored_account("2", false), false).await;

    let state = h.manager.snapshot().await;
    assert_eq!(ids(&state.accounts), vec!["1"]);
    assert_eq!(state.active_user_id, None);
    assert_eq!(state.screen, Screen::Onboarding);
    assert!(!state.loading);
    assert!(state.error.visible);
    assert_eq!(state.error.message, SESSION_EXPIRED_MESSAGE);
    assert!(matches!(
        state.error.retry,
        Some(RetryAction::SelectAccount { ref account, is_new: false }) if account.user_id == "2"
    ));
    assert_eq!(ids(&h.repo.load_accounts().unwrap()), vec!["1"]);
}

#[tokio::test]
async fn test_select_failure_of_last_account_resets_theme() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", true)]).unwrap();
    repo.set_active_user("1").unwrap();
    let auth = MockAuthApi::new(LogoutBehavior::Succeed);
    auth.fail_refresh("r-1");
    let h = start(store, repo, auth);
    assert_eq!(h.manager.theme().await, Theme::Dark);

    h.manager.select_account(stored_account("1", true), false).await;

    assert!(h.manager.accounts().await.is_empty());
    assert_eq!(h.manager.theme().await, Theme::Light);
    assert_eq!(h.surface.last(), Some(false));
    assert!(!h.store.contains_key(ACCOUNTS_KEY));
}

#[tokio::test]
async fn test_retry_reinserts_account_on_success() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false)]).unwrap();
    let auth = MockAuthApi::new(LogoutBehavior::Succeed);
    auth.fail_refresh("r-1");
    let h = start(store, repo, auth);

    h.manager.select_account(stored_account("1", false), false).await;
    assert!(h.manager.accounts().await.is_empty());

    h.auth.allow_refresh("r-1");
    h.manager.retry().await;

    let state = h.manager.snapshot().await;
    assert_eq!(ids(&state.accounts), vec!["1"]);
    assert_eq!(state.active_user_id.as_deref(), Some("1"));
    assert!(!state.error.visible);
    assert_eq!(h.auth.refresh_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retry_without_action_is_noop() {
    let (store, repo) = seeded_repo();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.retry().await;

    assert_eq!(h.auth.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_selection_is_discarded() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false), stored_account("2", false)])
        .unwrap();
    let auth = MockAuthApi::new(LogoutBehavior::Succeed).with_delay("r-1", Duration::from_secs(2));
    let h = start(store, repo, auth);

    let slow = {
        let manager = h.manager.clone();
        tokio::spawn(async move { manager.select_account(stored_account("1", false), false).await })
    };
    tokio::task::yield_now().await;

    h.manager.select_account(stored_account("2", false), false).await;
    assert_eq!(h.manager.active_user_id().await.as_deref(), Some("2"));

    slow.await.unwrap();

    let state = h.manager.snapshot().await;
    assert_eq!(state.active_user_id.as_deref(), Some("2"));
    assert_eq!(state.find("1").unwrap().access, "a-1");
    assert!(!state.loading);
}

#[tokio::test]
async fn test_remove_active_account() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", true)]).unwrap();
    repo.set_active_user("1").unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.remove_account("1").await;

    let state = h.manager.snapshot().await;
    assert!(state.accounts.is_empty());
    assert_eq!(state.active_user_id, None);
    assert_eq!(state.screen, Screen::Onboarding);
    assert_eq!(state.theme, Theme::Light);
    assert!(!state.loading);
    assert_eq!(h.auth.logout_calls(), vec!["r-1".to_string()]);
    assert!(!h.store.contains_key(ACCOUNTS_KEY));
    assert_eq!(h.repo.get_active_user().unwrap(), None);
}

#[tokio::test]
async fn test_remove_inactive_account_keeps_pointer() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false), stored_account("2", false)])
        .unwrap();
    repo.set_active_user("1").unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.remove_account("2").await;

    assert_eq!(ids(&h.manager.accounts().await), vec!["1"]);
    assert_eq!(h.manager.active_user_id().await.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_remove_with_failed_logout_still_cleans_up() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false), stored_account("2", false)])
        .unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Fail));

    h.manager.remove_account("1").await;

    assert_eq!(ids(&h.manager.accounts().await), vec!["2"]);
    assert_eq!(h.manager.screen().await, Screen::AccountSelection);
    assert!(!h.manager.is_loading().await);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_logout_cleaned_by_safety_timer() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false)]).unwrap();
    repo.set_active_user("1").unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Hang));

    let removal = {
        let manager = h.manager.clone();
        tokio::spawn(async move { manager.remove_account("1").await })
    };
    tokio::task::yield_now().await;
    assert!(h.manager.is_loading().await);

    tokio::time::sleep(Duration::from_millis(5_500)).await;

    let state = h.manager.snapshot().await;
    assert!(state.accounts.is_empty());
    assert_eq!(state.active_user_id, None);
    assert!(!state.loading);
    assert!(!removal.is_finished());

    removal.await.unwrap();
    assert!(h.manager.accounts().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_safety_timer_spares_readded_account() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false)]).unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.remove_account("1").await;
    h.manager.add_account(new_account("1", false), false).await;

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(ids(&h.manager.accounts().await), vec!["1"]);
    assert_eq!(h.manager.active_user_id().await.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_logout_keeps_account() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false)]).unwrap();
    repo.set_active_user("1").unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.logout_current_account().await;

    let state = h.manager.snapshot().await;
    assert_eq!(ids(&state.accounts), vec!["1"]);
    assert_eq!(state.active_user_id, None);
    assert_eq!(state.screen, Screen::AccountSelection);
    assert!(h.auth.logout_calls().is_empty());
    assert_eq!(h.repo.get_active_user().unwrap(), None);
}

#[tokio::test]
async fn test_logout_without_session_is_noop() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false)]).unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));
    h.manager.set_screen(Screen::ConfirmLogout).await;

    let before = h.manager.snapshot().await;
    h.manager.logout_current_account().await;

    assert_eq!(h.manager.snapshot().await, before);
}

#[tokio::test]
async fn test_set_theme_mirrors_into_active_account() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false)]).unwrap();
    repo.set_active_user("1").unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.set_theme(Theme::Dark).await;

    assert_eq!(h.manager.theme().await, Theme::Dark);
    assert!(h.manager.active_account().await.unwrap().dark_mode);
    assert!(h.repo.load_accounts().unwrap()[0].dark_mode);
    assert_eq!(h.repo.get_theme().unwrap(), Some(Theme::Dark));
    assert_eq!(h.surface.last(), Some(true));
}

#[tokio::test]
async fn test_toggle_theme_without_active_account() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false)]).unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    assert_eq!(h.manager.toggle_theme().await, Theme::Dark);
    assert_eq!(h.repo.get_theme().unwrap(), Some(Theme::Dark));
    assert!(!h.repo.load_accounts().unwrap()[0].dark_mode);

    assert_eq!(h.manager.toggle_theme().await, Theme::Light);
    assert_eq!(h.surface.last(), Some(false));
}

#[tokio::test]
async fn test_removal_confirmation_flow() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false), stored_account("2", false)])
        .unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.request_removal("2").await;
    assert_eq!(h.manager.screen().await, Screen::ConfirmLogout);
    assert_eq!(h.manager.pending_removal().await.unwrap().user_id, "2");

    h.manager.cancel_removal().await;
    assert_eq!(h.manager.screen().await, Screen::AccountSelection);
    assert!(h.manager.pending_removal().await.is_none());

    h.manager.request_removal("2").await;
    h.manager.confirm_removal().await;

    assert_eq!(ids(&h.manager.accounts().await), vec!["1"]);
    assert!(h.manager.pending_removal().await.is_none());
    assert_eq!(h.manager.screen().await, Screen::AccountSelection);
}

#[tokio::test]
async fn test_request_removal_of_unknown_account() {
    let (store, repo) = seeded_repo();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.request_removal("missing").await;

    assert!(h.manager.pending_removal().await.is_none());
    assert_eq!(h.manager.screen().await, Screen::Onboarding);
}

#[tokio::test]
async fn test_dismiss_error() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false)]).unwrap();
    let auth = MockAuthApi::new(LogoutBehavior::Succeed);
    auth.fail_refresh("r-1");
    let h = start(store, repo, auth);

    h.manager.select_account(stored_account("1", false), true).await;
    assert!(h.manager.error().await.visible);

    h.manager.dismiss_error().await;
    assert_eq!(h.manager.error().await, UiError::hidden());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_completes_pending_removal() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false), stored_account("2", false)])
        .unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Hang));

    let manager = h.manager.clone();
    let removal = tokio::spawn(async move { manager.remove_account("1").await });
    tokio::task::yield_now().await;

    h.manager.shutdown().await;

    assert_eq!(ids(&h.manager.accounts().await), vec!["2"]);
    assert_eq!(ids(&h.repo.load_accounts().unwrap()), vec!["2"]);
    removal.abort();
}

#[tokio::test]
async fn test_initialize_from_legacy_store() {
    let store = Arc::new(MemoryStore::with_entries([
        (
            "accounts",
            r#"[{"userId":"7","name":"Ana","email":"ana@example.org","access":"a","refresh":"r","lastLogin":"05/03/2023 08:00:00","role":"acs"}]"#,
        ),
        ("activeUser", "7"),
        ("theme", "dark"),
    ]));
    let repo = Arc::new(KeyValueStateRepository::new(store.clone()));
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    let active = h.manager.active_account().await.unwrap();
    assert_eq!(active.name, "Ana");
    assert_eq!(active.role, Role::Provider);
    // Legacy records carry no preference, so the account's light mode wins.
    assert_eq!(h.manager.theme().await, Theme::Light);
}

#[tokio::test]
async fn test_initialize_with_corrupt_accounts_starts_empty() {
    let store = Arc::new(MemoryStore::with_entries([("accounts", "{not json"), ("activeUser", "1")]));
    let repo = Arc::new(KeyValueStateRepository::new(store.clone()));
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    let state = h.manager.snapshot().await;
    assert!(state.accounts.is_empty());
    assert_eq!(state.active_user_id, None);
    assert_eq!(state.screen, Screen::Onboarding);
}

#[tokio::test]
async fn test_theme_survives_reload() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false)]).unwrap();
    repo.set_active_user("1").unwrap();
    let h = start(store.clone(), repo.clone(), MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.set_theme(Theme::Dark).await;
    h.manager.shutdown().await;

    let reloaded = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));
    assert_eq!(reloaded.manager.theme().await, Theme::Dark);
    assert!(reloaded.manager.active_account().await.unwrap().dark_mode);
    assert_eq!(reloaded.surface.last(), Some(true));
}

#[tokio::test(start_paused = true)]
async fn test_removal_during_selection_keeps_account_removed() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false), stored_account("2", false)])
        .unwrap();
    let auth = MockAuthApi::new(LogoutBehavior::Succeed).with_delay("r-1", Duration::from_secs(2));
    let h = start(store, repo, auth);

    let selection = {
        let manager = h.manager.clone();
        tokio::spawn(async move { manager.select_account(stored_account("1", false), false).await })
    };
    tokio::task::yield_now().await;

    h.manager.remove_account("1").await;
    assert_eq!(ids(&h.manager.accounts().await), vec!["2"]);

    selection.await.unwrap();

    let state = h.manager.snapshot().await;
    assert_eq!(ids(&state.accounts), vec!["2"]);
    assert_eq!(state.active_user_id, None);
    assert!(!state.loading);
    assert_eq!(ids(&h.repo.load_accounts().unwrap()), vec!["2"]);
    assert_eq!(h.repo.get_active_user().unwrap(), None);
}

#[tokio::test]
async fn test_select_of_unstored_account_is_dropped() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("2", false)]).unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.select_account(stored_account("9", false), false).await;

    let state = h.manager.snapshot().await;
    assert_eq!(ids(&state.accounts), vec!["2"]);
    assert_eq!(state.active_user_id, None);
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_failed_selection_keeps_account() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false), stored_account("2", false)])
        .unwrap();
    repo.set_active_user("2").unwrap();
    let auth = MockAuthApi::new(LogoutBehavior::Succeed).with_delay("r-1", Duration::from_secs(2));
    auth.fail_refresh("r-1");
    let h = start(store, repo, auth);

    let slow = {
        let manager = h.manager.clone();
        tokio::spawn(async move { manager.select_account(stored_account("1", false), false).await })
    };
    tokio::task::yield_now().await;

    h.manager.select_account(stored_account("2", false), false).await;
    slow.await.unwrap();

    let state = h.manager.snapshot().await;
    assert_eq!(ids(&state.accounts), vec!["1", "2"]);
    assert_eq!(state.active_user_id.as_deref(), Some("2"));
    assert!(!state.error.visible);
    assert_eq!(state.screen, Screen::AccountSelection);
    assert!(!state.loading);
    assert_eq!(ids(&h.repo.load_accounts().unwrap()), vec!["1", "2"]);
}

#[tokio::test]
async fn test_onboarding_only_when_last_account_removed() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[
        stored_account("1", false),
        stored_account("2", false),
        stored_account("3", false),
    ])
    .unwrap();
    repo.set_active_user("1").unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Succeed));

    h.manager.remove_account("1").await;
    assert_eq!(h.manager.screen().await, Screen::AccountSelection);
    assert_eq!(h.manager.active_user_id().await, None);

    h.manager.remove_account("2").await;
    assert_eq!(h.manager.screen().await, Screen::AccountSelection);

    h.manager.remove_account("3").await;
    assert_eq!(h.manager.screen().await, Screen::Onboarding);
    assert!(h.manager.accounts().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_account_readded_after_safety_cleanup_survives_timeout() {
    let (store, repo) = seeded_repo();
    repo.save_accounts(&[stored_account("1", false), stored_account("2", false)])
        .unwrap();
    let h = start(store, repo, MockAuthApi::new(LogoutBehavior::Hang));

    let removal = {
        let manager = h.manager.clone();
        tokio::spawn(async move { manager.remove_account("1").await })
    };
    tokio::task::yield_now().await;

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(ids(&h.manager.accounts().await), vec!["2"]);

    h.manager.add_account(new_account("1", false), false).await;
    removal.await.unwrap();

    let state = h.manager.snapshot().await;
    assert_eq!(ids(&state.accounts), vec!["2", "1"]);
    assert_eq!(state.active_user_id.as_deref(), Some("1"));
    assert!(!state.loading);
}
