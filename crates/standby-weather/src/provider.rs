//! OpenWeatherMap current-conditions client.

use crate::types::{OwmCurrentResponse, OwmErrorBody, WeatherError, WeatherSnapshot};
use chrono::Utc;
use reqwest::{Client, StatusCode};
use standby_core::{Language, WeatherConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

const USER_AGENT: &str = concat!("standby/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    zip_code: String,
    language: Language,
}

impl WeatherProvider {
    /// Build a provider whose every request is bounded by `timeout`.
    pub fn new(
        config: &WeatherConfig,
        language: Language,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            zip_code: config.zip_code.clone(),
            language,
        })
    }

    /// Fetch current conditions for the configured postal code.
    #[instrument(skip(self), fields(zip = %self.zip_code), level = "info")]
    pub async fn fetch(&self) -> Result<WeatherSnapshot, WeatherError> {
        if self.api_key.trim().is_empty() {
            return Err(WeatherError::NotConfigured("API key"));
        }
        if self.zip_code.trim().is_empty() {
            return Err(WeatherError::NotConfigured("postal code"));
        }

        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("zip", self.zip_code.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.language.code()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<OwmErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_default();
            tracing::debug!("Weather API returned {}: {}", status, message);
            return Err(match status {
                StatusCode::UNAUTHORIZED => WeatherError::InvalidApiKey,
                StatusCode::NOT_FOUND => WeatherError::LocationNotFound(self.zip_code.clone()),
                _ => WeatherError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body: OwmCurrentResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let snapshot = body.into_snapshot(Utc::now())?;
        tracing::info!(
            "Weather: {}°C, {}, {}%",
            snapshot.temperature,
            snapshot.condition_text,
            snapshot.humidity_percent
        );
        Ok(snapshot)
    }
}
