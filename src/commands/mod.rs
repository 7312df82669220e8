pub mod auth;
pub mod search;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use eventsync_core::{
    CalendarService, CalendarWindow, Event, Normalizer, SearchCriterion, SyncEngine, SyncReport,
    dedupe, ensure_calendar, search_terms,
};

use crate::config::{self, Config};

/// Window starting today in `tz` and running `days` days forward.
pub fn upcoming_window(tz: Tz, days: u64) -> Result<CalendarWindow> {
    let today = Utc::now().with_timezone(&tz).date_naive();
    Ok(CalendarWindow::upcoming(today, days)?)
}

/// Load search criteria from `terms` if given, else from the configured path.
pub fn load_criteria(cfg: &Config, terms: Option<&Path>) -> Result<Vec<SearchCriterion>> {
    let path = match terms {
        Some(path) => config::expand_path(&path.to_string_lossy()),
        None => cfg.search_terms_path(),
    };

    search_terms::load(&path)
        .with_context(|| format!("Failed to load search terms from {}", path.display()))
}

/// Reconcile each calendar's matches against the remote service in turn.
///
/// A calendar that cannot be found or created is skipped; the rest still run.
pub async fn sync_groups<S: CalendarService + ?Sized>(
    service: &S,
    groups: &[(String, Vec<&Event>)],
    normalizer: Normalizer,
    window: &CalendarWindow,
    dry_run: bool,
) -> SyncReport {
    let engine = SyncEngine::new(service, normalizer).dry_run(dry_run);
    let start = window.start_str();
    let end = window.end_str();

    let mut total = SyncReport::default();

    for (calendar_name, matches) in groups {
        let calendar = match ensure_calendar(service, calendar_name, normalizer.time_zone()).await {
            Ok(calendar) => calendar,
            Err(e) => {
                tracing::error!(calendar = %calendar_name, error = %e, "Skipping calendar");
                println!("\nSkipping calendar '{}': {}", calendar_name, e);
                continue;
            }
        };

        let unique = dedupe(matches.iter().copied());
        println!(
            "\nSynchronizing {} unique events to calendar '{}'",
            unique.len(),
            calendar_name
        );

        let report = engine.synchronize(&unique, &calendar, &start, &end).await;
        println!("  {}", report);

        total.merge(&report);
    }

    total
}
