//! Wire types for the parts of the Calendar v3 API that eventsync uses.

use eventsync_core::RemoteCalendar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListPage {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    pub time_zone: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

impl From<CalendarListEntry> for RemoteCalendar {
    fn from(entry: CalendarListEntry) -> Self {
        RemoteCalendar {
            id: entry.id,
            name: entry.summary,
            time_zone: entry.time_zone,
        }
    }
}

/// Body of `POST /calendars`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendar<'a> {
    pub summary: &'a str,
    pub time_zone: &'a str,
}

/// Response of `POST /calendars`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCalendar {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<EventItem>,
    pub next_page_token: Option<String>,
}

/// Only the id matters for reconciliation.
#[derive(Debug, Deserialize)]
pub struct EventItem {
    #[serde(default)]
    pub id: String,
}

/// `{"error": {"code": 409, "message": "..."}}`
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
}
