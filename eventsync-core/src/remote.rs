//! The remote calendar system, as seen by the sync engine.
//!
//! Implementations receive an already-authenticated handle; token handling
//! lives with the provider.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono_tz::Tz;
use serde::Serialize;

use crate::datetime::Normalizer;
use crate::error::SyncResult;
use crate::window::CalendarWindow;

/// A calendar collection on the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCalendar {
    pub id: String,
    pub name: String,
    pub time_zone: Option<String>,
}

/// One page of entry identifiers from a time-range listing.
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// A start or end instant as written to the remote calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryTime {
    /// RFC 3339 with explicit offset
    pub date_time: String,
    pub time_zone: String,
}

/// Insert payload for a new calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCalendarEntry {
    /// Caller-chosen id; equal to the source event id
    pub id: String,
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: EntryTime,
    pub end: EntryTime,
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    /// All calendar collections visible to the account.
    async fn list_calendars(&self) -> SyncResult<Vec<RemoteCalendar>>;

    async fn create_calendar(&self, name: &str, time_zone: &str) -> SyncResult<RemoteCalendar>;

    /// One page of entries overlapping `time_min..time_max` (RFC 3339).
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: &str,
        time_max: &str,
        page_token: Option<&str>,
    ) -> SyncResult<EventPage>;

    async fn insert_event(&self, calendar_id: &str, entry: &NewCalendarEntry) -> SyncResult<()>;
}

/// Find a calendar by display name, creating it if absent.
pub async fn ensure_calendar<S: CalendarService + ?Sized>(
    service: &S,
    name: &str,
    tz: Tz,
) -> SyncResult<RemoteCalendar> {
    let calendars = service.list_calendars().await?;

    if let Some(calendar) = calendars.into_iter().find(|c| c.name == name) {
        match calendar.time_zone.as_deref() {
            Some(existing) if existing != tz.name() => tracing::warn!(
                calendar = name,
                time_zone = existing,
                expected = tz.name(),
                "Calendar time zone differs from configured zone"
            ),
            _ => {}
        }
        return Ok(calendar);
    }

    tracing::info!(calendar = name, time_zone = tz.name(), "Creating calendar");
    service.create_calendar(name, tz.name()).await
}

/// Reads which entry ids already exist in a calendar over a window.
pub struct WindowReader<'a, S: ?Sized> {
    service: &'a S,
    normalizer: Normalizer,
}

impl<'a, S: CalendarService + ?Sized> WindowReader<'a, S> {
    pub fn new(service: &'a S, normalizer: Normalizer) -> Self {
        WindowReader {
            service,
            normalizer,
        }
    }

    /// Identifiers of every entry between `start` and `end` (YYYY-MM-DD, inclusive).
    ///
    /// Never fails: an invalid window or a remote error is logged and whatever
    /// was collected so far is returned.
    pub async fn existing_ids(&self, calendar_id: &str, start: &str, end: &str) -> HashSet<String> {
        let mut ids = HashSet::new();

        let bounds = CalendarWindow::parse(start, end).and_then(|window| {
            Ok((
                window.time_min(&self.normalizer)?,
                window.time_max(&self.normalizer)?,
            ))
        });
        let (time_min, time_max) = match bounds {
            Ok(bounds) => bounds,
            Err(e) => {
                tracing::error!(calendar_id, error = %e, "Cannot query existing events");
                return ids;
            }
        };

        let mut page_token: Option<String> = None;
        loop {
            let page = match self
                .service
                .list_events(calendar_id, &time_min, &time_max, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        calendar_id,
                        collected = ids.len(),
                        error = %e,
                        "Failed to fetch existing events"
                    );
                    return ids;
                }
            };

            ids.extend(page.ids.into_iter().filter(|id| !id.is_empty()));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(calendar_id, count = ids.len(), start, end, "Fetched existing event ids");
        ids
    }
}
