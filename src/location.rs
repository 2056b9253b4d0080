use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocationError {
    #[error("no location fix could be obtained: {0}")]
    Unavailable(String),

    #[error("reverse geocoding returned no address candidates")]
    AddressUnresolved,
}

/// Device coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// A reverse-geocoded place description.
///
/// Platform geocoders leave fields they cannot resolve empty, so every field
/// is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub iso_country_code: Option<String>,
}

impl fmt::Display for Address {
    /// Single-line rendering, e.g. `Unter den Linden 1, 10117 Berlin, Germany`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        match (&self.street, &self.street_number) {
            (Some(street), Some(number)) => parts.push(format!("{street} {number}")),
            (Some(street), None) => parts.push(street.clone()),
            _ => {}
        }
        match (&self.postal_code, &self.city) {
            (Some(postal), Some(city)) => parts.push(format!("{postal} {city}")),
            (None, Some(city)) => parts.push(city.clone()),
            (Some(postal), None) => parts.push(postal.clone()),
            _ => {}
        }
        if let Some(region) = &self.region {
            if self.city.as_deref() != Some(region.as_str()) {
                parts.push(region.clone());
            }
        }
        if let Some(country) = &self.country {
            parts.push(country.clone());
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Platform location service: GPS fix plus reverse geocoding.
#[async_trait]
pub trait LocationService: Send + Sync {
    /// Current device coordinates.
    async fn current_position(&self) -> Result<Position, LocationError>;

    /// Address candidates for the coordinates, best match first. May
    /// legitimately return an empty list.
    async fn reverse_geocode(&self, position: &Position) -> Result<Vec<Address>, LocationError>;
}

/// Resolves coordinates to a human-readable address using the first
/// candidate.
///
/// # Errors
///
/// Returns [`LocationError::AddressUnresolved`] when the geocoder yields no
/// candidates, so an empty result is a typed failure rather than an
/// out-of-bounds index.
pub async fn resolve_address(
    service: &dyn LocationService,
    position: &Position,
) -> Result<Address, LocationError> {
    let candidates = service.reverse_geocode(position).await?;
    candidates
        .into_iter()
        .next()
        .ok_or(LocationError::AddressUnresolved)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub(crate) fn berlin_address() -> Address {
        Address {
            street: Some("Unter den Linden".to_string()),
            street_number: Some("1".to_string()),
            postal_code: Some("10117".to_string()),
            city: Some("Berlin".to_string()),
            region: Some("Berlin".to_string()),
            country: Some("Germany".to_string()),
            iso_country_code: Some("DE".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::berlin_address;
    use super::*;

    struct ScriptedGeocoder {
        candidates: Vec<Address>,
    }

    #[async_trait]
    impl LocationService for ScriptedGeocoder {
        async fn current_position(&self) -> Result<Position, LocationError> {
            Ok(Position {
                latitude: 52.52,
                longitude: 13.405,
            })
        }

        async fn reverse_geocode(
            &self,
            _position: &Position,
        ) -> Result<Vec<Address>, LocationError> {
            Ok(self.candidates.clone())
        }
    }

    #[tokio::test]
    async fn test_first_candidate_is_used() {
        let mut second = berlin_address();
        second.city = Some("Potsdam".to_string());
        let service = ScriptedGeocoder {
            candidates: vec![berlin_address(), second],
        };
        let position = service.current_position().await.unwrap();

        let address = resolve_address(&service, &position).await.unwrap();
        assert_eq!(address.city.as_deref(), Some("Berlin"));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_a_typed_failure() {
        let service = ScriptedGeocoder { candidates: vec![] };
        let position = Position {
            latitude: 0.0,
            longitude: 0.0,
        };

        let result = resolve_address(&service, &position).await;
        assert!(matches!(result, Err(LocationError::AddressUnresolved)));
    }

    #[test]
    fn test_display_joins_resolved_parts() {
        let rendered = berlin_address().to_string();
        assert_eq!(rendered, "Unter den Linden 1, 10117 Berlin, Germany");
    }

    #[test]
    fn test_display_skips_missing_parts() {
        let address = Address {
            city: Some("Berlin".to_string()),
            country: Some("Germany".to_string()),
            ..Address::default()
        };
        assert_eq!(address.to_string(), "Berlin, Germany");
    }

    #[test]
    fn test_display_keeps_region_when_distinct_from_city() {
        let mut address = berlin_address();
        address.region = Some("Brandenburg".to_string());
        assert_eq!(
            address.to_string(),
            "Unter den Linden 1, 10117 Berlin, Brandenburg, Germany"
        );
    }
}
