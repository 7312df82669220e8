//! Append-only synchronization of candidate events into one calendar.
//!
//! Each source event id is reused as the remote entry id, so the set of ids
//! already in the calendar window is all that is needed to make repeated
//! runs insert nothing new. Existing entries are never updated or deleted.

use std::collections::HashSet;
use std::fmt;

use crate::datetime::{EventSpan, Normalizer};
use crate::event::Event;
use crate::remote::{CalendarService, EntryTime, NewCalendarEntry, RemoteCalendar, WindowReader};
use crate::window::CalendarWindow;

const UNTITLED: &str = "Untitled Event";

/// Outcome counts for one `synchronize` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: usize,
    pub already_present: usize,
    /// Missing id, missing fields or unparseable date/time
    pub invalid: usize,
    /// Rejected by the remote calendar
    pub failed: usize,
}

impl SyncReport {
    pub fn merge(&mut self, other: &SyncReport) {
        self.inserted += other.inserted;
        self.already_present += other.already_present;
        self.invalid += other.invalid;
        self.failed += other.failed;
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} already present, {} invalid, {} failed",
            self.inserted, self.already_present, self.invalid, self.failed
        )
    }
}

pub struct SyncEngine<'a, S: ?Sized> {
    service: &'a S,
    normalizer: Normalizer,
    dry_run: bool,
}

impl<'a, S: CalendarService + ?Sized> SyncEngine<'a, S> {
    pub fn new(service: &'a S, normalizer: Normalizer) -> Self {
        SyncEngine {
            service,
            normalizer,
            dry_run: false,
        }
    }

    /// Skip the insert calls, logging what would have been added.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Insert every candidate not already present in `calendar` between
    /// `start` and `end` (YYYY-MM-DD, inclusive). Candidates are expected
    /// to be filtered and deduplicated; they are processed in order.
    pub async fn synchronize(
        &self,
        candidates: &[&Event],
        calendar: &RemoteCalendar,
        start: &str,
        end: &str,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        if candidates.is_empty() {
            tracing::info!(calendar = %calendar.name, "No events to synchronize");
            return report;
        }

        if let Err(e) = CalendarWindow::parse(start, end) {
            tracing::error!(calendar = %calendar.name, error = %e, "Skipping synchronization");
            return report;
        }

        let existing: HashSet<String> = WindowReader::new(self.service, self.normalizer)
            .existing_ids(&calendar.id, start, end)
            .await;

        for event in candidates {
            let event_id = event.id();
            if event_id.is_empty() {
                report.invalid += 1;
                continue;
            }
            if existing.contains(event_id) {
                report.already_present += 1;
                continue;
            }

            let span = match self.normalizer.normalize(
                event.event_date(),
                event.start_time(),
                event.end_time(),
            ) {
                Ok(span) => span,
                Err(e) => {
                    tracing::warn!(event_id, error = %e, "Skipping event");
                    report.invalid += 1;
                    continue;
                }
            };

            let entry = build_entry(event, &span);

            if self.dry_run {
                tracing::info!(
                    event_id,
                    title = %entry.summary,
                    start = %entry.start.date_time,
                    calendar = %calendar.name,
                    "Would add event"
                );
                report.inserted += 1;
                continue;
            }

            match self.service.insert_event(&calendar.id, &entry).await {
                Ok(()) => {
                    tracing::info!(
                        event_id,
                        title = %entry.summary,
                        calendar = %calendar.name,
                        "Added event"
                    );
                    report.inserted += 1;
                }
                Err(e) => {
                    tracing::error!(
                        event_id,
                        title = %entry.summary,
                        calendar = %calendar.name,
                        error = %e,
                        "Failed to add event"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(calendar = %calendar.name, "No events deleted");
        report
    }
}

/// Insert payload for `event` at `span`.
pub fn build_entry(event: &Event, span: &EventSpan) -> NewCalendarEntry {
    let summary = match event.title.as_deref() {
        Some(title) => title.to_string(),
        None => UNTITLED.to_string(),
    };
    let time_zone = span.time_zone().to_string();

    NewCalendarEntry {
        id: event.id().to_string(),
        summary,
        location: event.location().to_string(),
        description: describe(event),
        start: EntryTime {
            date_time: span.start_rfc3339(),
            time_zone: time_zone.clone(),
        },
        end: EntryTime {
            date_time: span.end_rfc3339(),
            time_zone,
        },
    }
}

fn describe(event: &Event) -> String {
    let tags: Vec<&str> = event.tag_names().collect();
    format!(
        "Tags: {}\nCategory: {}",
        tags.join(", "),
        event.category_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::dedupe;
    use crate::filter::filter;
    use crate::criteria::SearchCriterion;
    use crate::testing::FakeCalendar;
    use chrono_tz::America::New_York;
    use serde_json::json;

    const START: &str = "2024-06-01";
    const END: &str = "2024-06-15";

    fn calendar() -> RemoteCalendar {
        RemoteCalendar {
            id: "cal-1".into(),
            name: "Fitness".into(),
            time_zone: Some("America/New_York".into()),
        }
    }

    fn yoga() -> Event {
        serde_json::from_value(json!({
            "eventId": "1",
            "title": "Yoga Class",
            "location": "Rec Center",
            "eventDate": "2024-06-01T00:00:00",
            "startTime": "9:00 AM",
            "endTime": "10:00 AM",
            "category": { "name": "Fitness" },
            "tags": [{ "name": "wellness" }]
        }))
        .unwrap()
    }

    fn event(id: &str, start_time: Option<&str>, end_time: &str) -> Event {
        serde_json::from_value(json!({
            "eventId": id,
            "title": format!("Event {id}"),
            "eventDate": "2024-06-02T00:00:00",
            "startTime": start_time,
            "endTime": end_time,
        }))
        .unwrap()
    }

    fn engine(service: &FakeCalendar) -> SyncEngine<'_, FakeCalendar> {
        SyncEngine::new(service, Normalizer::new(New_York))
    }

    #[tokio::test]
    async fn test_yoga_scenario_inserts_one_entry() {
        let events = vec![yoga()];
        let criterion = SearchCriterion {
            calendar: "Fitness".into(),
            title: "yoga".into(),
            ..Default::default()
        };
        let candidates = dedupe(filter(&events, &criterion));
        assert_eq!(candidates.len(), 1);

        let service = FakeCalendar::new();
        let report = engine(&service)
            .synchronize(&candidates, &calendar(), START, END)
            .await;

        assert_eq!(report.inserted, 1);
        let inserted = service.inserted();
        assert_eq!(inserted.len(), 1);

        let entry = &inserted[0];
        assert_eq!(entry.id, "1");
        assert_eq!(entry.summary, "Yoga Class");
        assert_eq!(entry.location, "Rec Center");
        assert_eq!(entry.description, "Tags: wellness\nCategory: Fitness");
        assert_eq!(entry.start.date_time, "2024-06-01T09:00:00-04:00");
        assert_eq!(entry.end.date_time, "2024-06-01T10:00:00-04:00");
        assert_eq!(entry.start.time_zone, "America/New_York");
        assert_eq!(entry.end.time_zone, "America/New_York");
    }

    #[tokio::test]
    async fn test_second_run_inserts_nothing() {
        let events = vec![yoga(), event("2", Some("1:00 PM"), "2:00 PM")];
        let candidates = dedupe(&events);
        let service = FakeCalendar::new();

        let first = engine(&service)
            .synchronize(&candidates, &calendar(), START, END)
            .await;
        let second = engine(&service)
            .synchronize(&candidates, &calendar(), START, END)
            .await;

        assert_eq!(first.inserted, 2);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.already_present, 2);
        assert_eq!(service.inserted().len(), 2);
    }

    #[tokio::test]
    async fn test_existing_ids_are_fetched_once_per_call() {
        let events = vec![yoga(), event("2", Some("1:00 PM"), ""), event("3", Some("2:00 PM"), "")];
        let candidates = dedupe(&events);
        let service = FakeCalendar::new().with_pages(vec![vec!["2".into()], vec!["x".into()]]);

        let report = engine(&service)
            .synchronize(&candidates, &calendar(), START, END)
            .await;

        // Two pages, fetched once before any insert.
        assert_eq!(service.list_queries().len(), 2);
        assert_eq!(report.already_present, 1);
        assert_eq!(service.inserted_ids(), vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_missing_start_time_skips_only_that_event() {
        let events = vec![
            event("1", None, "10:00 AM"),
            event("2", Some("11:00 AM"), "12:00 PM"),
        ];
        let candidates = dedupe(&events);
        let service = FakeCalendar::new();

        let report = engine(&service)
            .synchronize(&candidates, &calendar(), START, END)
            .await;

        assert_eq!(report.invalid, 1);
        assert_eq!(service.inserted_ids(), vec!["2"]);
    }

    #[tokio::test]
    async fn test_empty_end_time_gives_zero_length_entry() {
        let events = vec![event("1", Some("11:00 AM"), "")];
        let candidates = dedupe(&events);
        let service = FakeCalendar::new();

        engine(&service)
            .synchronize(&candidates, &calendar(), START, END)
            .await;

        let entry = &service.inserted()[0];
        assert_eq!(entry.start, entry.end);
        assert_eq!(entry.end.date_time, "2024-06-02T11:00:00-04:00");
    }

    #[tokio::test]
    async fn test_rejected_insert_does_not_stop_later_events() {
        let events = vec![
            event("1", Some("9:00 AM"), ""),
            event("2", Some("10:00 AM"), ""),
            event("3", Some("11:00 AM"), ""),
        ];
        let candidates = dedupe(&events);
        let service = FakeCalendar::new().rejecting("2");

        let report = engine(&service)
            .synchronize(&candidates, &calendar(), START, END)
            .await;

        assert_eq!(report.failed, 1);
        assert_eq!(service.inserted_ids(), vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_malformed_date_skips_event() {
        let mut bad = event("1", Some("9:00 AM"), "");
        bad.event_date = Some("June 2nd".into());
        let events = vec![bad, event("2", Some("9:00 AM"), "")];
        let candidates: Vec<&Event> = events.iter().collect();
        let service = FakeCalendar::new();

        let report = engine(&service)
            .synchronize(&candidates, &calendar(), START, END)
            .await;

        assert_eq!(report.invalid, 1);
        assert_eq!(service.inserted_ids(), vec!["2"]);
    }

    #[tokio::test]
    async fn test_empty_candidates_or_bad_window_is_a_no_op() {
        let service = FakeCalendar::new();
        let report = engine(&service)
            .synchronize(&[], &calendar(), START, END)
            .await;
        assert_eq!(report, SyncReport::default());

        let events = vec![yoga()];
        let candidates = dedupe(&events);
        let report = engine(&service)
            .synchronize(&candidates, &calendar(), "2024-06-01", "soon")
            .await;
        assert_eq!(report, SyncReport::default());

        assert!(service.list_queries().is_empty());
        assert!(service.inserted().is_empty());
    }

    #[tokio::test]
    async fn test_window_query_failure_still_inserts() {
        let events = vec![yoga()];
        let candidates = dedupe(&events);
        let service = FakeCalendar::new().failing_list_at(0);

        let report = engine(&service)
            .synchronize(&candidates, &calendar(), START, END)
            .await;

        assert_eq!(report.inserted, 1);
    }

    #[tokio::test]
    async fn test_dry_run_queries_but_never_inserts() {
        let events = vec![yoga()];
        let candidates = dedupe(&events);
        let service = FakeCalendar::new();

        let report = engine(&service)
            .dry_run(true)
            .synchronize(&candidates, &calendar(), START, END)
            .await;

        assert_eq!(report.inserted, 1);
        assert_eq!(service.list_queries().len(), 1);
        assert!(service.inserted().is_empty());
    }

    #[test]
    fn test_entry_defaults_for_sparse_event() {
        let event: Event = serde_json::from_value(json!({
            "eventId": 55,
            "category": "broken"
        }))
        .unwrap();
        let span = Normalizer::new(New_York)
            .normalize("2024-06-01T00:00:00", "9:00 AM", "")
            .unwrap();

        let entry = build_entry(&event, &span);
        assert_eq!(entry.id, "55");
        assert_eq!(entry.summary, "Untitled Event");
        assert_eq!(entry.location, "");
        assert_eq!(entry.description, "Tags: \nCategory: ");
    }

    #[test]
    fn test_report_merge_and_display() {
        let mut total = SyncReport::default();
        total.merge(&SyncReport {
            inserted: 2,
            already_present: 1,
            invalid: 0,
            failed: 1,
        });
        total.merge(&SyncReport {
            inserted: 1,
            ..Default::default()
        });
        assert_eq!(
            total.to_string(),
            "3 added, 1 already present, 0 invalid, 1 failed"
        );
    }
}
