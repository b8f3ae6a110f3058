use anyhow::Result;

use cuidar_application::AccountSessionManager;
use cuidar_core::theme::Theme;

pub async fn show(manager: &AccountSessionManager) -> Result<()> {
    println!("{}", manager.theme().await);
    Ok(())
}

pub async fn set(manager: &AccountSessionManager, value: &str) -> Result<()> {
    let theme: Theme = value.parse()?;
    manager.set_theme(theme).await;
    println!("{}", theme);
    Ok(())
}

pub async fn toggle(manager: &AccountSessionManager) -> Result<()> {
    println!("{}", manager.toggle_theme().await);
    Ok(())
}
