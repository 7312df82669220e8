//! Google Calendar v3 REST client.
//!
//! Talks to the API directly so that page tokens and caller-chosen event
//! ids are under our control.

use std::fmt;

use async_trait::async_trait;
use eventsync_core::{
    CalendarService, EventPage, NewCalendarEntry, RemoteCalendar, SyncError, SyncResult,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{CalendarListPage, CreatedCalendar, ErrorBody, EventsPage, NewCalendar};

const BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

#[derive(Clone)]
pub struct GoogleCalendar {
    access_token: String,
    http_client: reqwest::Client,
    base_url: String,
}

impl GoogleCalendar {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, BASE_URL)
    }

    /// Point the client at another host (used by tests).
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The account's primary calendar; its name is the account email.
    pub async fn primary_calendar(&self) -> SyncResult<RemoteCalendar> {
        let mut page_token: Option<String> = None;
        loop {
            let page = self.calendar_list_page(page_token.as_deref()).await?;
            if let Some(primary) = page.items.into_iter().find(|c| c.primary) {
                return Ok(primary.into());
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Err(SyncError::Remote {
            status: 404,
            message: "No primary calendar found".to_string(),
        })
    }

    async fn calendar_list_page(&self, page_token: Option<&str>) -> SyncResult<CalendarListPage> {
        let mut url = self.endpoint(&["users", "me", "calendarList"])?;
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }
        self.get(url).await
    }

    /// `base_url` joined with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> SyncResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SyncError::Config(format!("Invalid API base URL {}: {e}", self.base_url)))?;

        url.path_segments_mut()
            .map_err(|_| SyncError::Config(format!("API base URL {} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> SyncResult<T> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(network_error)?;

        handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, url: Url, body: &B) -> SyncResult<T> {
        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;

        handle_response(response).await
    }
}

#[async_trait]
impl CalendarService for GoogleCalendar {
    async fn list_calendars(&self) -> SyncResult<Vec<RemoteCalendar>> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.calendar_list_page(page_token.as_deref()).await?;
            calendars.extend(page.items.into_iter().map(RemoteCalendar::from));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(calendars)
    }

    async fn create_calendar(&self, name: &str, time_zone: &str) -> SyncResult<RemoteCalendar> {
        let url = self.endpoint(&["calendars"])?;
        let body = NewCalendar {
            summary: name,
            time_zone,
        };

        let created: CreatedCalendar = self.post(url, &body).await?;

        Ok(RemoteCalendar {
            id: created.id,
            name: if created.summary.is_empty() {
                name.to_string()
            } else {
                created.summary
            },
            time_zone: created.time_zone,
        })
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: &str,
        time_max: &str,
        page_token: Option<&str>,
    ) -> SyncResult<EventPage> {
        let mut url = self.endpoint(&["calendars", calendar_id, "events"])?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("singleEvents", "true")
                .append_pair("timeMin", time_min)
                .append_pair("timeMax", time_max)
                .append_pair("fields", "items(id),nextPageToken");
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        let page: EventsPage = self.get(url).await?;

        Ok(EventPage {
            ids: page.items.into_iter().map(|item| item.id).collect(),
            next_page_token: page.next_page_token,
        })
    }

    async fn insert_event(&self, calendar_id: &str, entry: &NewCalendarEntry) -> SyncResult<()> {
        let url = self.endpoint(&["calendars", calendar_id, "events"])?;
        let _: serde_json::Value = self.post(url, entry).await?;
        Ok(())
    }
}

impl fmt::Debug for GoogleCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCalendar")
            .field("access_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn network_error(e: reqwest::Error) -> SyncError {
    SyncError::Network(e.to_string())
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> SyncResult<T> {
    let status = response.status();

    if status.is_success() {
        return response.json::<T>().await.map_err(|e| SyncError::Remote {
            status: status.as_u16(),
            message: format!("Unexpected response body: {e}"),
        });
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) if !body.error.message.is_empty() => body.error.message,
        _ if !text.is_empty() => text,
        _ => status.canonical_reason().unwrap_or("Unknown error").to_string(),
    };

    Err(SyncError::Remote {
        status: status.as_u16(),
        message,
    })
}
