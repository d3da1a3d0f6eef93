//! HTTP client for the Google Calendar API v3.
//!
//! Thin layer over `events.list`: builds the query for a time window,
//! follows `nextPageToken` pagination, classifies error status codes, and
//! converts wire events into [`CalendarEvent`] values.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};
use weekmail_core::{CalendarEvent, EventTime, TimeWindow};

use crate::error::{GoogleError, GoogleResult};

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Client for Calendar API requests, authenticated with a bearer token.
#[derive(Debug)]
pub struct CalendarApiClient {
    http_client: reqwest::Client,
}

impl CalendarApiClient {
    pub fn new(timeout: Duration) -> GoogleResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GoogleError::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Lists events on `calendar_id` within the time window.
    ///
    /// Recurring events are expanded (`singleEvents=true`) and ordered by
    /// start time. All pages are fetched before returning.
    ///
    /// # Errors
    ///
    /// HTTP failures are classified by status: 401 is an authentication
    /// error, 403 authorization, 429 rate limiting, 5xx a server error.
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> GoogleResult<Vec<CalendarEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .fetch_page(access_token, calendar_id, window, page_token.as_deref())
                .await?;

            debug!("fetched page with {} events", page.items.len());
            events.extend(page.items.into_iter().filter_map(ApiEvent::into_event));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("fetched {} events total", events.len());
        Ok(events)
    }

    async fn fetch_page(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: &TimeWindow,
        page_token: Option<&str>,
    ) -> GoogleResult<EventsPage> {
        let url = format!(
            "{}/calendars/{}/events",
            CALENDAR_API_BASE,
            urlencoding::encode(calendar_id)
        );

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", window.start.to_rfc3339().as_str()),
                ("timeMax", window.end.to_rfc3339().as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GoogleError::network(format!("events request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GoogleError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::classify_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| GoogleError::invalid_response(format!("invalid events response: {}", e)))
    }

    fn classify_error(status: reqwest::StatusCode, body: &str) -> GoogleError {
        match status.as_u16() {
            401 => GoogleError::authentication(format!("access token rejected: {}", body)),
            403 => GoogleError::authorization(format!("calendar access denied: {}", body)),
            429 => GoogleError::rate_limited(format!("rate limit exceeded: {}", body)),
            500..=599 => GoogleError::server(format!("server error ({}): {}", status, body)),
            _ => GoogleError::invalid_response(format!("unexpected status {}: {}", status, body)),
        }
    }
}

/// One page of an `events.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<ApiEvent>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Wire representation of a calendar event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    start: Option<ApiEventTime>,
    #[serde(default)]
    end: Option<ApiEventTime>,
}

/// Start or end of a wire event: `dateTime` for timed events, `date` for
/// all-day events.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl ApiEventTime {
    fn into_event_time(self) -> EventTime {
        let raw = self.date_time.or(self.date).unwrap_or_default();
        EventTime::parse(&raw)
    }
}

impl ApiEvent {
    /// Converts a wire event, dropping cancelled entries.
    fn into_event(self) -> Option<CalendarEvent> {
        if self.status.as_deref() == Some("cancelled") {
            debug!("skipping cancelled event {}", self.id);
            return None;
        }

        let (start, end) = match (self.start, self.end) {
            (Some(start), Some(end)) => (start.into_event_time(), end.into_event_time()),
            _ => {
                warn!("event {} missing start or end, skipping", self.id);
                return None;
            }
        };

        let summary = self.summary.unwrap_or_else(|| "(no title)".to_string());
        Some(CalendarEvent::new(self.id, summary, start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod conversion {
        use super::*;

        #[test]
        fn timed_event() {
            let json = r#"{
                "id": "evt1",
                "summary": "Standup",
                "status": "confirmed",
                "start": {"dateTime": "2024-03-04T09:00:00Z"},
                "end": {"dateTime": "2024-03-04T09:15:00Z"}
            }"#;

            let api: ApiEvent = serde_json::from_str(json).unwrap();
            let event = api.into_event().unwrap();
            assert_eq!(event.summary, "Standup");
            assert!(matches!(event.start, EventTime::DateTime(_)));
            assert!(matches!(event.end, EventTime::DateTime(_)));
        }

        #[test]
        fn all_day_event() {
            let json = r#"{
                "id": "evt2",
                "summary": "Conference",
                "start": {"date": "2024-03-05"},
                "end": {"date": "2024-03-06"}
            }"#;

            let api: ApiEvent = serde_json::from_str(json).unwrap();
            let event = api.into_event().unwrap();
            assert!(matches!(event.start, EventTime::AllDay(_)));
        }

        #[test]
        fn cancelled_event_is_dropped() {
            let json = r#"{
                "id": "evt3",
                "status": "cancelled",
                "start": {"dateTime": "2024-03-04T09:00:00Z"},
                "end": {"dateTime": "2024-03-04T09:15:00Z"}
            }"#;

            let api: ApiEvent = serde_json::from_str(json).unwrap();
            assert!(api.into_event().is_none());
        }

        #[test]
        fn missing_times_are_dropped() {
            let json = r#"{"id": "evt4", "summary": "Broken"}"#;

            let api: ApiEvent = serde_json::from_str(json).unwrap();
            assert!(api.into_event().is_none());
        }

        #[test]
        fn untitled_event_gets_placeholder() {
            let json = r#"{
                "id": "evt5",
                "start": {"dateTime": "2024-03-04T09:00:00Z"},
                "end": {"dateTime": "2024-03-04T09:15:00Z"}
            }"#;

            let api: ApiEvent = serde_json::from_str(json).unwrap();
            let event = api.into_event().unwrap();
            assert_eq!(event.summary, "(no title)");
        }
    }

    mod pages {
        use super::*;

        #[test]
        fn page_with_token() {
            let json = r#"{
                "items": [],
                "nextPageToken": "tok123"
            }"#;

            let page: EventsPage = serde_json::from_str(json).unwrap();
            assert_eq!(page.next_page_token, Some("tok123".to_string()));
        }

        #[test]
        fn empty_response() {
            let page: EventsPage = serde_json::from_str("{}").unwrap();
            assert!(page.items.is_empty());
            assert!(page.next_page_token.is_none());
        }
    }

    mod errors {
        use super::*;
        use crate::error::GoogleErrorCode;

        #[test]
        fn status_classification() {
            let cases = [
                (401, GoogleErrorCode::AuthenticationFailed),
                (403, GoogleErrorCode::AuthorizationFailed),
                (429, GoogleErrorCode::RateLimited),
                (500, GoogleErrorCode::ServerError),
                (503, GoogleErrorCode::ServerError),
                (418, GoogleErrorCode::InvalidResponse),
            ];

            for (status, expected) in cases {
                let err = CalendarApiClient::classify_error(
                    reqwest::StatusCode::from_u16(status).unwrap(),
                    "body",
                );
                assert_eq!(err.code(), expected, "status {}", status);
            }
        }
    }
}
