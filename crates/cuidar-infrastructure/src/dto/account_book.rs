//! Account book DTOs and migrations
//!
//! The account list is persisted as a single flat, versioned JSON document:
//!
//! ```json
//! { "version": "1.1.0", "accounts": [ { "userId": "...", ... } ] }
//! ```

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use cuidar_core::account::{Account, AccountBook, Role};

/// Entity name registered with the migrator.
pub const ACCOUNT_BOOK_ENTITY: &str = "account_book";

/// Version assumed for documents written before the list was versioned.
pub const LEGACY_ACCOUNT_BOOK_VERSION: &str = "1.0.0";

// ============================================================================
// Account DTOs
// ============================================================================

/// Account record V1.0.0 (no theme preference, no social name).
///
/// Snake-case aliases accept lists written by older clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountV1_0_0 {
    #[serde(alias = "user_id")]
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub access: String,
    pub refresh: String,
    #[serde(default, alias = "last_login")]
    pub last_login: String,
    #[serde(default)]
    pub role: Role,
}

/// Account record V1.1.0 (adds `darkMode` and `socialName`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountV1_1_0 {
    #[serde(alias = "user_id")]
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, alias = "social_name", skip_serializing_if = "Option::is_none")]
    pub social_name: Option<String>,
    pub access: String,
    pub refresh: String,
    #[serde(default, alias = "dark_mode")]
    pub dark_mode: bool,
    #[serde(default, alias = "last_login")]
    pub last_login: String,
    #[serde(default)]
    pub role: Role,
}

impl From<AccountV1_0_0> for AccountV1_1_0 {
    fn from(dto: AccountV1_0_0) -> Self {
        AccountV1_1_0 {
            user_id: dto.user_id,
            name: dto.name,
            email: dto.email,
            picture: dto.picture,
            social_name: None,
            access: dto.access,
            refresh: dto.refresh,
            dark_mode: false,
            last_login: dto.last_login,
            role: dto.role,
        }
    }
}

impl From<AccountV1_1_0> for Account {
    fn from(dto: AccountV1_1_0) -> Self {
        Account {
            user_id: dto.user_id,
            name: dto.name,
            email: dto.email,
            picture: dto.picture,
            social_name: dto.social_name,
            access: dto.access,
            refresh: dto.refresh,
            dark_mode: dto.dark_mode,
            last_login: dto.last_login,
            role: dto.role,
        }
    }
}

impl From<Account> for AccountV1_1_0 {
    fn from(account: Account) -> Self {
        AccountV1_1_0 {
            user_id: account.user_id,
            name: account.name,
            email: account.email,
            picture: account.picture,
            social_name: account.social_name,
            access: account.access,
            refresh: account.refresh,
            dark_mode: account.dark_mode,
            last_login: account.last_login,
            role: account.role,
        }
    }
}

// ============================================================================
// AccountBook DTOs
// ============================================================================

/// Account book V1.0.0.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct AccountBookV1_0_0 {
    #[serde(default)]
    pub accounts: Vec<AccountV1_0_0>,
}

/// Account book V1.1.0.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
pub struct AccountBookV1_1_0 {
    #[serde(default)]
    pub accounts: Vec<AccountV1_1_0>,
}

/// Type alias for the latest AccountBook version.
pub type AccountBookDTO = AccountBookV1_1_0;

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from AccountBookV1_0_0 to AccountBookV1_1_0.
/// Accounts default to the light theme and carry no social name.
impl MigratesTo<AccountBookV1_1_0> for AccountBookV1_0_0 {
    fn migrate(self) -> AccountBookV1_1_0 {
        AccountBookV1_1_0 {
            accounts: self.accounts.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<AccountBook> for AccountBookV1_1_0 {
    fn into_domain(self) -> AccountBook {
        AccountBook {
            accounts: self.accounts.into_iter().map(Into::into).collect(),
        }
    }
}

impl FromDomain<AccountBook> for AccountBookV1_1_0 {
    fn from_domain(book: AccountBook) -> Self {
        AccountBookV1_1_0 {
            accounts: book.accounts.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for AccountBook entities.
///
/// # Migration Path
///
/// - V1.0.0 → V1.1.0: Adds `darkMode` (false) and `socialName` (absent)
/// - V1.1.0 → AccountBook: Converts DTO to domain model
pub fn create_account_book_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let account_book_path = version_migrate::Migrator::define(ACCOUNT_BOOK_ENTITY)
        .from::<AccountBookV1_0_0>()
        .step::<AccountBookV1_1_0>()
        .into_with_save::<AccountBook>();

    migrator
        .register(account_book_path)
        .expect("Failed to register account_book migration path");

    migrator
}

/// Wraps a bare JSON array (the unversioned legacy layout) into a flat
/// versioned document. Other values pass through unchanged.
pub fn normalize_legacy_account_list(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(accounts) => serde_json::json!({
            "version": LEGACY_ACCOUNT_BOOK_VERSION,
            "accounts": accounts,
        }),
        other => other,
    }
}
