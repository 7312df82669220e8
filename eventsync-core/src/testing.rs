//! In-memory `CalendarService` used by unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{SyncError, SyncResult};
use crate::remote::{CalendarService, EventPage, NewCalendarEntry, RemoteCalendar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub calendar_id: String,
    pub time_min: String,
    pub time_max: String,
    pub page_token: Option<String>,
}

#[derive(Default)]
struct State {
    calendars: Vec<RemoteCalendar>,
    pages: Vec<Vec<String>>,
    fail_list_at: Option<usize>,
    fail_list_calendars: bool,
    rejected_ids: HashSet<String>,
    queries: Vec<ListQuery>,
    inserted: Vec<(String, NewCalendarEntry)>,
    created: Vec<(String, String)>,
}

/// Serves canned pages and records every call. Inserted entries show up in
/// later listings of the same calendar, like a real remote would.
#[derive(Default)]
pub struct FakeCalendar {
    state: Mutex<State>,
}

impl FakeCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendars(self, calendars: Vec<RemoteCalendar>) -> Self {
        self.state.lock().unwrap().calendars = calendars;
        self
    }

    pub fn with_pages(self, pages: Vec<Vec<String>>) -> Self {
        self.state.lock().unwrap().pages = pages;
        self
    }

    pub fn failing_list_at(self, page: usize) -> Self {
        self.state.lock().unwrap().fail_list_at = Some(page);
        self
    }

    pub fn failing_list_calendars(self) -> Self {
        self.state.lock().unwrap().fail_list_calendars = true;
        self
    }

    pub fn rejecting(self, id: &str) -> Self {
        self.state.lock().unwrap().rejected_ids.insert(id.to_string());
        self
    }

    pub fn list_queries(&self) -> Vec<ListQuery> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn inserted(&self) -> Vec<NewCalendarEntry> {
        self.state
            .lock()
            .unwrap()
            .inserted
            .iter()
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    pub fn inserted_ids(&self) -> Vec<String> {
        self.inserted().into_iter().map(|e| e.id).collect()
    }

    pub fn created_calendars(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().created.clone()
    }
}

#[async_trait]
impl CalendarService for FakeCalendar {
    async fn list_calendars(&self) -> SyncResult<Vec<RemoteCalendar>> {
        let state = self.state.lock().unwrap();
        if state.fail_list_calendars {
            return Err(SyncError::Network("connection reset".into()));
        }
        Ok(state.calendars.clone())
    }

    async fn create_calendar(&self, name: &str, time_zone: &str) -> SyncResult<RemoteCalendar> {
        let mut state = self.state.lock().unwrap();
        let calendar = RemoteCalendar {
            id: format!("created-{}", state.created.len()),
            name: name.to_string(),
            time_zone: Some(time_zone.to_string()),
        };
        state.created.push((name.to_string(), time_zone.to_string()));
        state.calendars.push(calendar.clone());
        Ok(calendar)
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: &str,
        time_max: &str,
        page_token: Option<&str>,
    ) -> SyncResult<EventPage> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(ListQuery {
            calendar_id: calendar_id.to_string(),
            time_min: time_min.to_string(),
            time_max: time_max.to_string(),
            page_token: page_token.map(str::to_string),
        });

        let index = page_token
            .and_then(|t| t.strip_prefix("page-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);

        if state.fail_list_at == Some(index) {
            return Err(SyncError::Remote {
                status: 503,
                message: "backend unavailable".into(),
            });
        }

        let page_count = state.pages.len().max(1);
        let mut ids = state.pages.get(index).cloned().unwrap_or_default();
        if index + 1 == page_count {
            ids.extend(
                state
                    .inserted
                    .iter()
                    .filter(|(cal, _)| cal == calendar_id)
                    .map(|(_, entry)| entry.id.clone()),
            );
        }

        let next_page_token = (index + 1 < page_count).then(|| format!("page-{}", index + 1));

        Ok(EventPage {
            ids,
            next_page_token,
        })
    }

    async fn insert_event(&self, calendar_id: &str, entry: &NewCalendarEntry) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.rejected_ids.contains(&entry.id) {
            return Err(SyncError::Remote {
                status: 400,
                message: "Invalid resource id value".into(),
            });
        }
        if state
            .inserted
            .iter()
            .any(|(cal, e)| cal == calendar_id && e.id == entry.id)
        {
            return Err(SyncError::Remote {
                status: 409,
                message: "The requested identifier already exists".into(),
            });
        }
        state.inserted.push((calendar_id.to_string(), entry.clone()));
        Ok(())
    }
}
