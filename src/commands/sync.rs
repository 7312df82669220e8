use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use eventsync_core::{Normalizer, group_by_calendar};

use crate::config::Config;
use crate::listing::ListingClient;

#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Query calendars but do not insert anything
    #[arg(long)]
    pub dry_run: bool,

    /// Search-terms CSV (defaults to search_terms from config)
    #[arg(long)]
    pub terms: Option<PathBuf>,

    /// Days after today to include (defaults to window_days from config)
    #[arg(long)]
    pub days: Option<u64>,
}

pub async fn run(cfg: &Config, args: SyncArgs) -> Result<()> {
    let tz = cfg.tz()?;
    let window = super::upcoming_window(tz, args.days.unwrap_or(cfg.window_days))?;

    let calendar = eventsync_provider_google::connect(cfg.google_account()?).await?;

    let criteria = super::load_criteria(cfg, args.terms.as_deref())?;

    println!(
        "Fetching events from {} to {}...",
        window.start_str(),
        window.end_str()
    );
    let events = ListingClient::new(&cfg.listing_url)
        .fetch(&window, cfg.max_results)
        .await?;
    println!("  Fetched {} events", events.len());

    let groups = group_by_calendar(&events, &criteria);
    if groups.is_empty() {
        println!("\nNo events matched any search criteria.");
        return Ok(());
    }

    if args.dry_run {
        println!("\nDry run: nothing will be added.");
    }

    let total =
        super::sync_groups(&calendar, &groups, Normalizer::new(tz), &window, args.dry_run).await;

    println!("\nTotal: {}", total);

    Ok(())
}
