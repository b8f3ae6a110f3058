use anyhow::Result;

use cuidar_application::AccountSessionManager;

/// Local logout; the account stays in the list.
pub async fn logout(manager: &AccountSessionManager) -> Result<()> {
    match manager.active_account().await {
        Some(account) => {
            manager.logout_current_account().await;
            println!("Logged out of {}.", account.display_name());
        }
        None => println!("No active session."),
    }
    Ok(())
}

pub async fn status(manager: &AccountSessionManager) -> Result<()> {
    let state = manager.snapshot().await;

    match state.active_account() {
        Some(account) => println!("Active:   {} ({})", account.display_name(), account.user_id),
        None => println!("Active:   none"),
    }
    println!("Accounts: {}", state.accounts.len());
    println!("Screen:   {:?}", state.screen);
    println!("Theme:    {}", state.theme);
    Ok(())
}
