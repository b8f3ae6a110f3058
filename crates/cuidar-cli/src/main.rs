use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod context;
mod telemetry;

#[derive(Parser)]
#[command(name = "cuidar")]
#[command(about = "Cuidar CLI - manage locally remembered accounts and sessions", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/cuidar/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session store file (defaults to ~/.local/share/cuidar/session.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored accounts
    Accounts,
    /// Add an account from a JSON file and sign in with it
    Add {
        /// JSON document with the account fields
        file: PathBuf,

        /// Mark the account as freshly registered
        #[arg(long)]
        new: bool,
    },
    /// Sign in with a stored account
    Select {
        user_id: String,
    },
    /// Log out remotely and forget a stored account
    Remove {
        user_id: String,
    },
    /// End the active session, keeping the account
    Logout,
    /// Theme commands
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Show the session state
    Status,
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Print the current theme
    Show,
    /// Set the theme (light or dark)
    Set { value: String },
    /// Switch between light and dark
    Toggle,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing()?;
    let cli = Cli::parse();

    let manager = context::build_manager(cli.config, cli.store)?;

    let result = match cli.command {
        Commands::Accounts => commands::accounts::list(&manager).await,
        Commands::Add { file, new } => commands::accounts::add(&manager, &file, new).await,
        Commands::Select { user_id } => commands::accounts::select(&manager, &user_id).await,
        Commands::Remove { user_id } => commands::accounts::remove(&manager, &user_id).await,
        Commands::Logout => commands::session::logout(&manager).await,
        Commands::Theme { action } => match action {
            ThemeAction::Show => commands::theme::show(&manager).await,
            ThemeAction::Set { value } => commands::theme::set(&manager, &value).await,
            ThemeAction::Toggle => commands::theme::toggle(&manager).await,
        },
        Commands::Status => commands::session::status(&manager).await,
    };

    manager.shutdown().await;
    result
}
