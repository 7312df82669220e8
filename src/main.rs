mod commands;
mod config;
mod listing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::search::SearchArgs;
use commands::sync::SyncArgs;

#[derive(Parser)]
#[command(name = "eventsync")]
#[command(about = "Copy matching community events into your Google calendars")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add matching upcoming events to their calendars (default)
    Sync(SyncArgs),
    /// Show which upcoming events match each search criterion
    Search(SearchArgs),
    /// Authenticate with Google Calendar
    Auth,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    match cli.command.unwrap_or_else(|| Commands::Sync(SyncArgs::default())) {
        Commands::Auth => commands::auth::run().await,
        Commands::Sync(args) => commands::sync::run(&config::load_config()?, args).await,
        Commands::Search(args) => commands::search::run(&config::load_config()?, args).await,
    }
}
