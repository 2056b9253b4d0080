use serde::{Deserialize, Serialize};

use crate::location::Address;
use crate::media::AssetRef;
use crate::sensors::SensorSnapshot;
use crate::weather::{TimezoneInfo, WeatherSnapshot};

/// The unit of persistence: one stored image paired with the metadata
/// gathered at the moment it was taken.
///
/// Records are immutable once written; there is no update operation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CaptureRecord {
    pub asset: AssetRef,
    pub metadata: CaptureMetadata,
}

/// Everything known about a capture besides the image itself.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetadata {
    /// Derived from the asset URI; the natural key for lookup and deletion.
    /// Assumed unique within the store.
    pub filename: String,
    pub address: Address,
    /// Decimal degrees of the location fix.
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: TimezoneInfo,
    /// Capture date localized to the photograph's timezone.
    pub date: String,
    /// Capture time-of-day localized to the photograph's timezone.
    pub time: String,
    pub weather: WeatherSnapshot,
    /// Ordered motion readings collected over the capture window.
    pub sensors: Vec<SensorSnapshot>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_record;

    // The camelCase keys are part of the persisted format; records written
    // by earlier versions must stay readable.
    #[test]
    fn test_persisted_shape_uses_camel_case_keys() {
        let record = sample_record("IMG_0001.jpg");
        let serialized = serde_json::to_string(&record).unwrap();

        assert!(serialized.contains("\"streetNumber\":\"1\""));
        assert!(serialized.contains("\"isoCountryCode\":\"DE\""));
        assert!(serialized.contains("\"weatherDescription\":\"clear sky\""));
        assert!(serialized.contains("\"accelerationIncludingGravity\""));
        assert!(serialized.contains("\"rotationRate\""));
        assert!(serialized.contains("\"utcOffsetHours\":1.0"));
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let record = sample_record("IMG_0001.jpg");
        let serialized = serde_json::to_string(&record).unwrap();
        let deserialized: super::CaptureRecord = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, record);
    }
}
