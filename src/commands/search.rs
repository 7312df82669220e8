use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use eventsync_core::{Event, SearchCriterion, filter};

use crate::config::Config;
use crate::listing::ListingClient;

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Search-terms CSV (defaults to search_terms from config)
    #[arg(long)]
    pub terms: Option<PathBuf>,

    /// Days after today to include (defaults to window_days from config)
    #[arg(long)]
    pub days: Option<u64>,
}

pub async fn run(cfg: &Config, args: SearchArgs) -> Result<()> {
    let tz = cfg.tz()?;
    let window = super::upcoming_window(tz, args.days.unwrap_or(cfg.window_days))?;

    let criteria = super::load_criteria(cfg, args.terms.as_deref())?;

    let events = ListingClient::new(&cfg.listing_url)
        .fetch(&window, cfg.max_results)
        .await?;
    println!(
        "Fetched {} events from {} to {}",
        events.len(),
        window.start_str(),
        window.end_str()
    );

    for criterion in &criteria {
        let matches = filter(&events, criterion);

        println!("\n{}", heading(criterion));
        if matches.is_empty() {
            println!("  No events found for {}", criterion.describe());
            continue;
        }

        for event in matches {
            println!("{}", format_event(event));
        }
    }

    Ok(())
}

fn heading(criterion: &SearchCriterion) -> String {
    format!("Events matching {}:", criterion)
}

fn format_event(event: &Event) -> String {
    let tags: Vec<&str> = event.tag_names().collect();

    format!(
        "  {} ({})\n    {} {} at {}\n    Category: {}\n    Tags: {}",
        event.title(),
        event.id(),
        event.event_date(),
        event.start_time(),
        event.location(),
        event.category_name(),
        tags.join(", ")
    )
}
