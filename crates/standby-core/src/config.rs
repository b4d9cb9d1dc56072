use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the OpenWeatherMap API key.
pub const ENV_WEATHER_API_KEY: &str = "OPENWEATHERMAP_API_KEY";
/// Environment variable holding the postal code used for weather lookups.
pub const ENV_ZIP_CODE: &str = "ZIP_CODE";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Display language. Drives weekday names, panel labels and the weather
/// API `lang` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ja,
    De,
    Fr,
}

impl Language {
    /// Language code understood by OpenWeatherMap.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ja => "ja",
            Self::De => "de",
            Self::Fr => "fr",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Window width in windowed mode
    pub window_width: u32,

    /// Window height in windowed mode
    pub window_height: u32,

    /// Native panel width used in full-screen mode
    pub panel_width: u32,

    /// Native panel height used in full-screen mode
    pub panel_height: u32,

    /// Frame rate cap for the clock animation
    pub target_fps: u32,

    /// IANA timezone used for the clock face and the calendar day boundary
    pub timezone: String,

    pub language: Language,

    /// Primary font name (e.g. "10x20"); unknown names fall back to the default
    pub font: String,

    /// TrueType/OpenType collection used for text outside Latin-1. When unset
    /// the usual Noto Sans CJK install locations are searched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cjk_font: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 480,
            panel_width: 800,
            panel_height: 480,
            target_fps: 60,
            timezone: "Asia/Tokyo".to_string(),
            language: Language::En,
            font: "10x20".to_string(),
            cjk_font: None,
        }
    }
}

impl DisplayConfig {
    /// Parse the configured timezone.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid(format!("unknown timezone: {}", self.timezone)))
    }

    /// Canvas size for the requested presentation mode.
    pub fn canvas_size(&self, windowed: bool) -> (u32, u32) {
        if windowed {
            (self.window_width, self.window_height)
        } else {
            (self.panel_width, self.panel_height)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key (overridden by OPENWEATHERMAP_API_KEY)
    pub api_key: String,

    /// Postal code, optionally with country suffix, e.g. "100-0001,JP" (overridden by ZIP_CODE)
    pub zip_code: String,

    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            zip_code: String::new(),
            base_url: "https://api.openweathermap.org".to_string(),
        }
    }
}

impl WeatherConfig {
    /// Check if the weather lookup has everything it needs
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.zip_code.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Google "installed app" client secrets file
    pub credentials_file: PathBuf,

    /// Directory holding one `token_<account>.json` per account
    pub token_dir: PathBuf,

    /// Named accounts, fetched independently
    pub accounts: Vec<String>,

    pub base_url: String,

    /// Keep the previous agenda when every account fails in a refresh cycle
    pub keep_agenda_on_total_failure: bool,

    /// Seconds to wait for the browser redirect during first-run consent
    pub consent_timeout_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from("credentials.json"),
            token_dir: PathBuf::from("."),
            accounts: vec!["personal".to_string(), "work".to_string()],
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            keep_agenda_on_total_failure: true,
            consent_timeout_secs: 120,
        }
    }
}

impl CalendarConfig {
    /// Token file for a named account.
    pub fn token_path(&self, account: &str) -> PathBuf {
        self.token_dir.join(format!("token_{}.json", account))
    }

    pub fn consent_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.consent_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between background refreshes
    pub interval_secs: u64,

    /// Per-request timeout for weather and calendar calls
    pub fetch_timeout_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            fetch_timeout_secs: 10,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }

    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from an explicit path, writing defaults if it doesn't exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Override secrets from the environment. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_WEATHER_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.weather.api_key = key;
        }
        if let Some(zip) = lookup(ENV_ZIP_CODE).filter(|v| !v.trim().is_empty()) {
            self.weather.zip_code = zip;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        for (field, value) in [
            ("display.window_width", self.display.window_width),
            ("display.window_height", self.display.window_height),
            ("display.panel_width", self.display.panel_width),
            ("display.panel_height", self.display.panel_height),
        ] {
            if value == 0 {
                result.add_error(field, "Dimension must be greater than 0");
            } else if value > 10000 {
                result.add_warning(field, "Dimension is unusually large (>10000)");
            }
        }

        if self.display.target_fps == 0 {
            result.add_error("display.target_fps", "Frame rate must be greater than 0");
        } else if self.display.target_fps > 240 {
            result.add_warning("display.target_fps", "Frame rate above 240 is wasted work");
        }

        if let Err(e) = self.display.tz() {
            result.add_error("display.timezone", e.to_string());
        }

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(&self.calendar.base_url, "calendar.base_url", &mut result);

        if !self.weather.is_configured() {
            result.add_warning(
                "weather",
                format!(
                    "{} / {} not set - weather will stay empty",
                    ENV_WEATHER_API_KEY, ENV_ZIP_CODE
                ),
            );
        }

        if self.calendar.accounts.is_empty() {
            result.add_warning("calendar.accounts", "No calendar accounts configured");
        }

        if self.calendar.consent_timeout_secs == 0 {
            result.add_error(
                "calendar.consent_timeout_secs",
                "Consent timeout must be greater than 0",
            );
        }

        if self.refresh.interval_secs == 0 {
            result.add_error("refresh.interval_secs", "Refresh interval must be greater than 0");
        } else if self.refresh.interval_secs < 60 {
            result.add_warning(
                "refresh.interval_secs",
                "Refreshing more than once a minute may hit API rate limits",
            );
        }

        if self.refresh.fetch_timeout_secs == 0 {
            result.add_error(
                "refresh.fetch_timeout_secs",
                "Fetch timeout must be greater than 0",
            );
        } else if self.refresh.fetch_timeout_secs >= self.refresh.interval_secs {
            result.add_warning(
                "refresh.fetch_timeout_secs",
                "Fetch timeout is not shorter than the refresh interval",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("standby");

        Ok(config_dir.join("config.toml"))
    }
}
