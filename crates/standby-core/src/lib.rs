pub mod config;
pub mod error;

pub use config::{
    CalendarConfig, Config, DisplayConfig, Language, RefreshConfig, ValidationResult,
    WeatherConfig,
};
pub use error::{AppError, ConfigError, DisplayError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging. Honors `RUST_LOG`, defaults to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("Standby core initialized");
    Ok(())
}
