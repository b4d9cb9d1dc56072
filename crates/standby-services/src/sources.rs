//! Data sources the refresh loop polls.

use chrono::{DateTime, Utc};
use std::future::Future;

use standby_calendar::{AgendaFetch, AgendaFetcher, CalendarBackend};
use standby_weather::{WeatherError, WeatherProvider, WeatherSnapshot};

/// Current weather, one request per call.
pub trait WeatherSource: Send + Sync {
    fn fetch_weather(&self) -> impl Future<Output = Result<WeatherSnapshot, WeatherError>> + Send;
}

/// Today's agenda across all accounts. Per-account failures are reported
/// inside the result, never as an error.
pub trait AgendaSource: Send + Sync {
    fn fetch_agenda(&self, now: DateTime<Utc>) -> impl Future<Output = AgendaFetch> + Send;
}

impl WeatherSource for WeatherProvider {
    async fn fetch_weather(&self) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch().await
    }
}

impl<B: CalendarBackend> AgendaSource for AgendaFetcher<B> {
    async fn fetch_agenda(&self, now: DateTime<Utc>) -> AgendaFetch {
        self.fetch(now).await
    }
}
