//! Client for the community event listing endpoint.

use anyhow::{Context, Result};
use eventsync_core::{CalendarWindow, Event, ListingResponse};

/// Constant query parameters the endpoint expects on every request.
const FIXED_PARAMS: &[(&str, &str)] = &[
    ("type_id", "0"),
    ("date_filter", "99"),
    ("tag_ids", ""),
    ("searchtext", ""),
    ("start_row", "0"),
    ("query_id", "00000000000000000000000000"),
];

pub struct ListingClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl ListingClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ListingClient {
            base_url: base_url.into(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Fetch every listed event in `window`, up to `max_results`.
    ///
    /// An empty listing is an error: nothing downstream can do useful work.
    pub async fn fetch(&self, window: &CalendarWindow, max_results: u32) -> Result<Vec<Event>> {
        let start_date = window.start_str();
        let end_date = window.end_str();
        let end_row = max_results.to_string();

        tracing::debug!(url = %self.base_url, %start_date, %end_date, "Fetching event listing");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(FIXED_PARAMS)
            .query(&[
                ("start_date", start_date.as_str()),
                ("end_date", end_date.as_str()),
                ("end_row", end_row.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to reach event listing at {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Event listing returned {}: {}", status, body);
        }

        let listing: ListingResponse = response
            .json()
            .await
            .context("Failed to parse event listing response")?;

        if listing.data.is_empty() {
            anyhow::bail!("No events fetched for {} to {}", start_date, end_date);
        }

        Ok(listing.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn window() -> CalendarWindow {
        CalendarWindow::parse("2024-06-01", "2024-06-15").unwrap()
    }

    fn client(server: &MockServer) -> ListingClient {
        ListingClient::new(format!("{}/cc3/Api/EventList", server.uri()))
    }

    #[tokio::test]
    async fn test_fetch_sends_window_and_fixed_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cc3/Api/EventList"))
            .and(query_param("type_id", "0"))
            .and(query_param("date_filter", "99"))
            .and(query_param("tag_ids", ""))
            .and(query_param("searchtext", ""))
            .and(query_param("start_date", "2024-06-01"))
            .and(query_param("end_date", "2024-06-15"))
            .and(query_param("start_row", "0"))
            .and(query_param("end_row", "20000"))
            .and(query_param("query_id", "00000000000000000000000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "eventId": 48213, "title": "Yoga Class", "eventDate": "2024-06-01T00:00:00" },
                    { "eventId": "48214", "title": "Book Club" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let events = client(&server).fetch(&window(), 20000).await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id(), "48213");
        assert_eq!(events[1].title(), "Book Club");
    }

    #[tokio::test]
    async fn test_empty_listing_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;

        let err = client(&server).fetch(&window(), 100).await.unwrap_err();
        assert!(err.to_string().contains("No events fetched"));
    }

    #[tokio::test]
    async fn test_missing_data_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 0 })))
            .mount(&server)
            .await;

        assert!(client(&server).fetch(&window(), 100).await.is_err());
    }

    #[tokio::test]
    async fn test_server_error_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client(&server).fetch(&window(), 100).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("maintenance"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server).fetch(&window(), 100).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
