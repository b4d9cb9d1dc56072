//! Google Calendar API client.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;
use tracing::instrument;

use crate::error::CalendarError;
use crate::types::*;

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Calendar whose events are shown; every account shows its own primary calendar.
pub const PRIMARY_CALENDAR: &str = "primary";

const MAX_PAGES: usize = 20;

/// Read-only events client shared by all accounts. The bearer token is
/// passed per call.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    client: reqwest::Client,
    base_url: String,
}

impl CalendarClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CalendarError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn auth_header(access_token: &str) -> String {
        format!("Bearer {}", access_token)
    }

    /// List one page of events from a calendar within a time range.
    #[instrument(skip(self, access_token), level = "info")]
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        page_token: Option<&str>,
    ) -> Result<EventListResponse, CalendarError> {
        let mut url = format!(
            "{}/calendars/{}/events?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime&maxResults=250",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(&time_min.to_rfc3339_opts(SecondsFormat::Secs, true)),
            urlencoding::encode(&time_max.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );

        if let Some(pt) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(pt)));
        }

        let response = self
            .client
            .get(&url)
            .header("Authorization", Self::auth_header(access_token))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// All events of the primary calendar in `[time_min, time_max)`,
    /// following pagination.
    pub async fn list_all_events(
        &self,
        access_token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<ApiEvent>, CalendarError> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page = self
                .list_events(
                    access_token,
                    PRIMARY_CALENDAR,
                    time_min,
                    time_max,
                    page_token.as_deref(),
                )
                .await?;

            events.extend(page.items);
            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => return Ok(events),
            }
        }

        tracing::warn!("Stopped paging events after {} pages", MAX_PAGES);
        Ok(events)
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 {
            Err(CalendarError::TokenRejected)
        } else if status.as_u16() == 403 {
            Err(CalendarError::AccessDenied)
        } else if status.as_u16() == 404 {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::CalendarNotFound(text))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(CalendarError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::ApiError(format!("{}: {}", status, text)))
        }
    }
}
