use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use standby_core::{NetworkError, ReqwestErrorExt};

/// Current conditions as shown on the panel.
///
/// Immutable once built; a successful fetch replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Degrees Celsius, rounded to the nearest integer
    pub temperature: i32,
    pub condition_text: String,
    pub humidity_percent: u8,
    pub fetched_at: DateTime<Utc>,
}

/// OpenWeatherMap current weather response (only the fields we use).
#[derive(Debug, Deserialize)]
pub(crate) struct OwmCurrentResponse {
    pub main: Option<OwmMain>,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwmMain {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwmCondition {
    pub description: Option<String>,
}

/// Error body OpenWeatherMap sends with 4xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct OwmErrorBody {
    pub message: Option<String>,
}

impl OwmCurrentResponse {
    /// Normalize into a snapshot; any missing field is a parse error.
    pub(crate) fn into_snapshot(
        self,
        fetched_at: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let main = self
            .main
            .ok_or_else(|| WeatherError::Parse("missing `main`".to_string()))?;
        let temp = main
            .temp
            .ok_or_else(|| WeatherError::Parse("missing `main.temp`".to_string()))?;
        let humidity = main
            .humidity
            .ok_or_else(|| WeatherError::Parse("missing `main.humidity`".to_string()))?;
        let condition_text = self
            .weather
            .into_iter()
            .next()
            .and_then(|w| w.description)
            .ok_or_else(|| WeatherError::Parse("missing `weather[0].description`".to_string()))?;

        if !temp.is_finite() || !humidity.is_finite() {
            return Err(WeatherError::Parse("non-finite measurement".to_string()));
        }

        Ok(WeatherSnapshot {
            temperature: temp.round() as i32,
            condition_text,
            humidity_percent: humidity.round().clamp(0.0, 100.0) as u8,
            fetched_at,
        })
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather not configured: {0}")]
    NotConfigured(&'static str),
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        WeatherError::Network(e.into_network_error())
    }
}

impl WeatherError {
    /// Whether waiting for the next cycle can fix this.
    pub fn is_retryable(&self) -> bool {
        match self {
            WeatherError::Network(e) => e.is_transient(),
            WeatherError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
