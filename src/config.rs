use std::time::Duration;

use thiserror::Error;

/// Default endpoint for the one-call weather lookup.
pub const DEFAULT_WEATHER_ENDPOINT: &str = "https://api.openweathermap.org/data/3.0/onecall";

/// Environment variable holding the weather API credential.
pub const WEATHER_API_KEY_VAR: &str = "MOMENTOGRAPH_WEATHER_API_KEY";

/// Environment variable overriding the weather endpoint.
pub const WEATHER_ENDPOINT_VAR: &str = "MOMENTOGRAPH_WEATHER_ENDPOINT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingKey(&'static str),
}

/// Runtime configuration for the capture pipeline.
///
/// The weather API key is always supplied via configuration, never embedded
/// in source. The timeout fields bound the external calls made during a
/// capture attempt.
#[derive(Debug, Clone)]
pub struct Config {
    pub weather_endpoint: String,
    pub weather_api_key: String,
    pub location_timeout: Duration,
    pub geocode_timeout: Duration,
    pub weather_timeout: Duration,
    /// Requested motion sensor update interval (finest available).
    pub sensor_interval: Duration,
}

impl Config {
    /// Creates a configuration with default endpoint, timeouts, and sensor
    /// interval for the given API key.
    pub fn new(weather_api_key: impl Into<String>) -> Self {
        Self {
            weather_endpoint: DEFAULT_WEATHER_ENDPOINT.to_string(),
            weather_api_key: weather_api_key.into(),
            location_timeout: Duration::from_secs(10),
            geocode_timeout: Duration::from_secs(10),
            weather_timeout: Duration::from_secs(15),
            sensor_interval: Duration::from_millis(16),
        }
    }

    /// Loads configuration from environment variables, honoring a `.env`
    /// file when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] when the weather API key variable
    /// is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let weather_api_key = std::env::var(WEATHER_API_KEY_VAR)
            .map_err(|_| ConfigError::MissingKey(WEATHER_API_KEY_VAR))?;

        let mut config = Self::new(weather_api_key);
        if let Ok(endpoint) = std::env::var(WEATHER_ENDPOINT_VAR) {
            config.weather_endpoint = endpoint;
        }
        Ok(config)
    }
}
