//! Calendar API types and the display model derived from them.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Title shown for events without a summary.
pub const UNTITLED: &str = "(No title)";

/// When an event is shown on the agenda.
///
/// Ordering puts all-day entries before every timed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DisplayTime {
    AllDay,
    At(NaiveTime),
}

impl DisplayTime {
    /// Label for the agenda row: `HH:MM`, or `All day`.
    pub fn label(&self) -> String {
        match self {
            DisplayTime::AllDay => "All day".to_string(),
            DisplayTime::At(t) => t.format("%H:%M").to_string(),
        }
    }
}

/// The account an event was fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSource {
    Personal,
    Work,
    Other(String),
}

impl EventSource {
    pub fn from_account(account: &str) -> Self {
        match account {
            "personal" => EventSource::Personal,
            "work" => EventSource::Work,
            other => EventSource::Other(other.to_string()),
        }
    }

    pub fn account(&self) -> &str {
        match self {
            EventSource::Personal => "personal",
            EventSource::Work => "work",
            EventSource::Other(name) => name,
        }
    }

    pub fn is_work(&self) -> bool {
        matches!(self, EventSource::Work)
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.account())
    }
}

/// One agenda row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub display_time: DisplayTime,
    pub title: String,
    pub source: EventSource,
}

impl CalendarEvent {
    pub fn new(display_time: DisplayTime, title: impl Into<String>, source: EventSource) -> Self {
        Self {
            display_time,
            title: title.into(),
            source,
        }
    }

    /// Convert an API event for display in `tz`.
    ///
    /// Returns `None` for cancelled events and for events whose start
    /// cannot be read.
    pub fn from_api(api: ApiEvent, source: EventSource, tz: Tz) -> Option<Self> {
        if api.status.as_deref() == Some("cancelled") {
            return None;
        }

        let display_time = match api.start.as_ref().and_then(|s| parse_display_time(s, tz)) {
            Some(t) => t,
            None => {
                tracing::debug!("Skipping event {} with unreadable start", api.id);
                return None;
            }
        };

        let title = api
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        Some(Self {
            display_time,
            title,
            source,
        })
    }
}

fn parse_display_time(api: &ApiEventTime, tz: Tz) -> Option<DisplayTime> {
    if let Some(dt_str) = &api.date_time {
        if let Ok(dt) = DateTime::parse_from_rfc3339(dt_str) {
            let local = dt.with_timezone(&tz);
            return NaiveTime::from_hms_opt(local.hour(), local.minute(), 0).map(DisplayTime::At);
        }
    }
    if let Some(date_str) = &api.date {
        if NaiveDate::parse_from_str(date_str, "%Y-%m-%d").is_ok() {
            return Some(DisplayTime::AllDay);
        }
    }
    None
}

// API Response Types

/// Google Calendar API event response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    #[serde(default)]
    pub id: String,
    pub summary: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

/// API response for event list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}
