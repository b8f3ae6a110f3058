use std::path::Path;

use anyhow::{Context, Result, bail};

use cuidar_application::AccountSessionManager;
use cuidar_core::account::{Account, NewAccount};

/// One line per account; the active one is starred.
pub async fn list(manager: &AccountSessionManager) -> Result<()> {
    let accounts = manager.accounts().await;
    if accounts.is_empty() {
        println!("No accounts stored.");
        return Ok(());
    }

    let active = manager.active_user_id().await;
    for account in &accounts {
        let marker = if active.as_deref() == Some(account.user_id.as_str()) { "*" } else { " " };
        println!("{} {}", marker, format_account(account));
    }
    Ok(())
}

pub async fn add(manager: &AccountSessionManager, file: &Path, is_new: bool) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let new_account: NewAccount = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid account JSON in {}", file.display()))?;
    let user_id = new_account.user_id.clone();

    manager.add_account(new_account, is_new).await;
    report_selection(manager, &user_id).await
}

pub async fn select(manager: &AccountSessionManager, user_id: &str) -> Result<()> {
    let Some(account) = manager.find_account(user_id).await else {
        bail!("No stored account with id '{}'", user_id);
    };

    manager.select_account(account, false).await;
    report_selection(manager, user_id).await
}

pub async fn remove(manager: &AccountSessionManager, user_id: &str) -> Result<()> {
    if manager.find_account(user_id).await.is_none() {
        bail!("No stored account with id '{}'", user_id);
    }

    manager.remove_account(user_id).await;
    println!("Removed account {}.", user_id);
    Ok(())
}

async fn report_selection(manager: &AccountSessionManager, user_id: &str) -> Result<()> {
    let error = manager.error().await;
    if error.visible {
        bail!("{}", error.message);
    }
    match manager.active_account().await {
        Some(account) if account.user_id == user_id => {
            println!("Signed in as {}.", account.display_name());
            Ok(())
        }
        _ => bail!("Account '{}' could not be selected", user_id),
    }
}

fn format_account(account: &Account) -> String {
    format!(
        "{}  {} <{}>  role={}  theme={}  last_login={}",
        account.user_id,
        account.display_name(),
        account.email,
        account.role,
        if account.dark_mode { "dark" } else { "light" },
        account.last_login,
    )
}
