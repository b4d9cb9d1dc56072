//! Google Calendar integration for Standby.
//!
//! Lists today's events for each configured account and merges them into
//! one sorted agenda.

pub mod agenda;
pub mod client;
pub mod day;
pub mod error;
pub mod fetch;
pub mod types;

pub use agenda::CalendarAgenda;
pub use client::CalendarClient;
pub use day::day_window;
pub use error::CalendarError;
pub use fetch::{AgendaFetch, AgendaFetcher, CalendarBackend, GoogleCalendarBackend};
pub use types::{ApiEvent, CalendarEvent, DisplayTime, EventSource};
