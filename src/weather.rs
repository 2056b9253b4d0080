use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("weather request failed")]
    Request(#[from] reqwest::Error),

    #[error("weather service returned status {0}")]
    Status(StatusCode),

    #[error("malformed weather payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("weather payload carried no condition summary")]
    MissingCondition,

    #[error("invalid UTC offset in weather payload: {0} seconds")]
    InvalidOffset(i32),

    #[error("invalid epoch timestamp in weather payload: {0}")]
    InvalidTimestamp(i64),
}

/// Raw one-call payload as served by the weather endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OneCallReport {
    pub lat: f64,
    pub lon: f64,
    /// IANA-style zone name of the queried coordinates.
    pub timezone: String,
    /// Offset from UTC in seconds at the queried coordinates.
    pub timezone_offset: i32,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CurrentConditions {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: i64,
    pub humidity: i64,
    pub dew_point: f64,
    pub uvi: f64,
    pub clouds: i64,
    /// The service omits visibility for some stations.
    #[serde(default)]
    pub visibility: Option<i64>,
    pub wind_speed: f64,
    pub wind_deg: i64,
    pub sunrise: i64,
    pub sunset: i64,
    pub weather: Vec<WeatherCondition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherCondition {
    pub description: String,
}

/// Weather conditions at the capture instant, formatted for display and
/// persisted verbatim inside the capture metadata.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub temperature: String,
    pub feels_like: String,
    pub sunrise: String,
    pub sunset: String,
    pub pressure: String,
    pub humidity: String,
    pub dew_point: String,
    pub uv_index: String,
    pub clouds: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    pub wind_speed: String,
    pub wind_degree: String,
    pub weather_description: String,
    pub is_daytime: bool,
}

impl WeatherSnapshot {
    /// Derives the display fields from a raw payload.
    ///
    /// Local time strings (sunrise/sunset) are computed with the payload's
    /// own `timezone_offset`, never the device timezone, so they reflect the
    /// photograph's location rather than the viewer's.
    ///
    /// # Errors
    ///
    /// Fails when the payload carries no condition summary, an offset
    /// outside the valid range, or an unrepresentable epoch timestamp.
    pub fn from_report(report: &OneCallReport) -> Result<Self, WeatherError> {
        let offset = payload_offset(report)?;
        let current = &report.current;
        let condition = current
            .weather
            .first()
            .ok_or(WeatherError::MissingCondition)?;

        Ok(Self {
            temperature: format!("{}°C", current.temp),
            feels_like: format!("{}°C", current.feels_like),
            sunrise: local_time(current.sunrise, offset)?
                .format("%H:%M")
                .to_string(),
            sunset: local_time(current.sunset, offset)?
                .format("%H:%M")
                .to_string(),
            pressure: format!("{} hPa", current.pressure),
            humidity: format!("{}%", current.humidity),
            dew_point: format!("{}°C", current.dew_point),
            uv_index: current.uvi.to_string(),
            clouds: format!("{}%", current.clouds),
            visibility: current.visibility.map(|meters| format!("{meters} meters")),
            wind_speed: format!("{} m/s", current.wind_speed),
            wind_degree: format!("{}°", current.wind_deg),
            weather_description: condition.description.clone(),
            is_daytime: current.dt >= current.sunrise && current.dt <= current.sunset,
        })
    }
}

/// Timezone context of a capture: zone name plus UTC offset in hours.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimezoneInfo {
    pub name: String,
    pub utc_offset_hours: f64,
}

impl fmt::Display for TimezoneInfo {
    /// Renders e.g. `Europe/Berlin (+1h)`, with underscores in the zone name
    /// replaced by spaces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.replace('_', " ");
        let hours = self.utc_offset_hours;
        let sign = if hours > 0.0 { "+" } else { "" };
        if hours.fract() == 0.0 {
            write!(f, "{name} ({sign}{}h)", hours as i64)
        } else {
            write!(f, "{name} ({sign}{hours}h)")
        }
    }
}

/// Localized capture timestamp, split the way the gallery renders it.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureTime {
    pub date: String,
    pub time: String,
    pub timezone: TimezoneInfo,
}

impl CaptureTime {
    /// Splits the payload's `current.dt` into local date and time-of-day
    /// strings using the payload's own offset.
    pub fn from_report(report: &OneCallReport) -> Result<Self, WeatherError> {
        let offset = payload_offset(report)?;
        let local = local_time(report.current.dt, offset)?;
        Ok(Self {
            date: local.format("%Y-%m-%d").to_string(),
            time: local.format("%H:%M").to_string(),
            timezone: TimezoneInfo {
                name: report.timezone.clone(),
                utc_offset_hours: f64::from(report.timezone_offset) / 3600.0,
            },
        })
    }
}

fn payload_offset(report: &OneCallReport) -> Result<FixedOffset, WeatherError> {
    FixedOffset::east_opt(report.timezone_offset)
        .ok_or(WeatherError::InvalidOffset(report.timezone_offset))
}

fn local_time(epoch: i64, offset: FixedOffset) -> Result<DateTime<FixedOffset>, WeatherError> {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|datetime| datetime.with_timezone(&offset))
        .ok_or(WeatherError::InvalidTimestamp(epoch))
}

/// Resolves coordinates to a weather report.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<OneCallReport, WeatherError>;
}

/// One-call weather client backed by the configured HTTP endpoint.
pub struct OneCallClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OneCallClient {
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(config.weather_timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.weather_endpoint.clone(),
            api_key: config.weather_api_key.clone(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OneCallClient {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<OneCallReport, WeatherError> {
        debug!(latitude, longitude, "requesting weather snapshot");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("exclude", "minutely,hourly,daily,alerts".to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status));
        }

        let body = response.text().await?;
        let report: OneCallReport = serde_json::from_str(&body)?;
        info!(timezone = %report.timezone, "weather snapshot received");
        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Epoch used across tests: 2023-11-14 22:13:20 UTC.
    pub(crate) const CAPTURE_EPOCH: i64 = 1_700_000_000;

    /// A clear evening in Berlin (UTC+1).
    pub(crate) fn berlin_report() -> OneCallReport {
        OneCallReport {
            lat: 52.52,
            lon: 13.405,
            timezone: "Europe/Berlin".to_string(),
            timezone_offset: 3600,
            current: CurrentConditions {
                dt: CAPTURE_EPOCH,
                temp: 18.2,
                feels_like: 17.8,
                pressure: 1012,
                humidity: 70,
                dew_point: 12.6,
                uvi: 0.0,
                clouds: 40,
                visibility: Some(10000),
                wind_speed: 3.5,
                wind_deg: 280,
                sunrise: CAPTURE_EPOCH - 3600,
                sunset: CAPTURE_EPOCH + 36000,
                weather: vec![WeatherCondition {
                    description: "clear sky".to_string(),
                }],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::berlin_report;
    use super::*;

    #[test]
    fn test_snapshot_formats_display_fields() {
        let snapshot = WeatherSnapshot::from_report(&berlin_report()).unwrap();

        assert_eq!(snapshot.temperature, "18.2°C");
        assert_eq!(snapshot.feels_like, "17.8°C");
        assert_eq!(snapshot.pressure, "1012 hPa");
        assert_eq!(snapshot.humidity, "70%");
        assert_eq!(snapshot.dew_point, "12.6°C");
        assert_eq!(snapshot.uv_index, "0");
        assert_eq!(snapshot.clouds, "40%");
        assert_eq!(snapshot.visibility.as_deref(), Some("10000 meters"));
        assert_eq!(snapshot.wind_speed, "3.5 m/s");
        assert_eq!(snapshot.wind_degree, "280°");
        assert_eq!(snapshot.weather_description, "clear sky");
        assert!(snapshot.is_daytime);
    }

    #[test]
    fn test_sun_times_use_payload_offset() {
        let snapshot = WeatherSnapshot::from_report(&berlin_report()).unwrap();

        // 21:13:20 UTC and 08:13:20 UTC next day, both shifted by +1h.
        assert_eq!(snapshot.sunrise, "22:13");
        assert_eq!(snapshot.sunset, "09:13");
    }

    #[test]
    fn test_capture_time_uses_payload_offset() {
        let capture_time = CaptureTime::from_report(&berlin_report()).unwrap();

        assert_eq!(capture_time.date, "2023-11-14");
        assert_eq!(capture_time.time, "23:13");
        assert_eq!(capture_time.timezone.name, "Europe/Berlin");
        assert_eq!(capture_time.timezone.utc_offset_hours, 1.0);
    }

    #[test]
    fn test_night_capture_is_flagged() {
        let mut report = berlin_report();
        report.current.sunset = report.current.dt - 1;

        let snapshot = WeatherSnapshot::from_report(&report).unwrap();
        assert!(!snapshot.is_daytime);
    }

    #[test]
    fn test_empty_condition_list_is_a_typed_failure() {
        let mut report = berlin_report();
        report.current.weather.clear();

        let result = WeatherSnapshot::from_report(&report);
        assert!(matches!(result, Err(WeatherError::MissingCondition)));
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let mut report = berlin_report();
        report.timezone_offset = 100_000;

        assert!(matches!(
            WeatherSnapshot::from_report(&report),
            Err(WeatherError::InvalidOffset(100_000))
        ));
    }

    #[test]
    fn test_timezone_display() {
        let berlin = TimezoneInfo {
            name: "Europe/Berlin".to_string(),
            utc_offset_hours: 1.0,
        };
        assert_eq!(berlin.to_string(), "Europe/Berlin (+1h)");

        let new_york = TimezoneInfo {
            name: "America/New_York".to_string(),
            utc_offset_hours: -4.0,
        };
        assert_eq!(new_york.to_string(), "America/New York (-4h)");

        let kathmandu = TimezoneInfo {
            name: "Asia/Kathmandu".to_string(),
            utc_offset_hours: 5.75,
        };
        assert_eq!(kathmandu.to_string(), "Asia/Kathmandu (+5.75h)");

        let utc = TimezoneInfo {
            name: "UTC".to_string(),
            utc_offset_hours: 0.0,
        };
        assert_eq!(utc.to_string(), "UTC (0h)");
    }

    #[test]
    fn test_payload_parses_without_visibility() {
        let body = r#"{
            "lat": 52.52,
            "lon": 13.405,
            "timezone": "Europe/Berlin",
            "timezone_offset": 3600,
            "current": {
                "dt": 1700000000,
                "temp": 18.2,
                "feels_like": 17.8,
                "pressure": 1012,
                "humidity": 70,
                "dew_point": 12.6,
                "uvi": 0.16,
                "clouds": 40,
                "wind_speed": 3.5,
                "wind_deg": 280,
                "sunrise": 1699996400,
                "sunset": 1700036000,
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}]
            }
        }"#;

        let report: OneCallReport = serde_json::from_str(body).unwrap();
        assert_eq!(report.current.visibility, None);

        let snapshot = WeatherSnapshot::from_report(&report).unwrap();
        assert_eq!(snapshot.visibility, None);
        assert_eq!(snapshot.uv_index, "0.16");
    }
}
