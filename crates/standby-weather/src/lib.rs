//! Weather lookup for the standby display.
//!
//! Fetches current conditions from OpenWeatherMap by postal code and
//! normalizes them into a [`WeatherSnapshot`].

pub mod provider;
pub mod types;

pub use provider::WeatherProvider;
pub use types::{WeatherError, WeatherSnapshot};
