use std::sync::Arc;

use tracing::info;

use crate::error::MomentographError;
use crate::media::{AssetRef, MediaStore};
use crate::records::{CaptureMetadata, CaptureRecord};
use crate::store::{RecordStore, StoreError};

/// Outcome of the delete confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteChoice {
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// One label/value line of the metadata view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    pub label: String,
    pub value: String,
}

/// Read/delete boundary for the gallery and metadata screens.
pub struct Gallery {
    store: Arc<RecordStore>,
    media: Arc<dyn MediaStore>,
}

impl Gallery {
    pub fn new(store: Arc<RecordStore>, media: Arc<dyn MediaStore>) -> Self {
        Self { store, media }
    }

    /// All records for the grid, refreshed on every open.
    pub async fn refresh(&self) -> Result<Vec<CaptureRecord>, StoreError> {
        self.store.list_all().await
    }

    /// Metadata rows for the record behind an asset.
    pub async fn show_metadata(&self, asset: &AssetRef) -> Result<Vec<MetadataRow>, StoreError> {
        let record = self.store.find_by_filename(&asset.filename).await?;
        Ok(metadata_rows(&record.metadata))
    }

    /// Deletes the record and its asset once the user confirms.
    pub async fn delete(
        &self,
        filename: &str,
        choice: DeleteChoice,
    ) -> Result<DeleteOutcome, MomentographError> {
        if choice == DeleteChoice::Cancel {
            return Ok(DeleteOutcome::Cancelled);
        }
        self.store.delete(filename, self.media.as_ref()).await?;
        info!(filename, "capture deleted from gallery");
        Ok(DeleteOutcome::Deleted)
    }
}

/// Flattens a metadata record into display rows, expanding address, weather,
/// and sensor sub-entries with dotted labels.
pub fn metadata_rows(metadata: &CaptureMetadata) -> Vec<MetadataRow> {
    let mut rows = Vec::new();
    let mut push = |label: &str, value: String| {
        rows.push(MetadataRow {
            label: label.to_string(),
            value,
        });
    };

    push("filename", metadata.filename.clone());

    let address = &metadata.address;
    for (label, value) in [
        ("address.street", &address.street),
        ("address.streetNumber", &address.street_number),
        ("address.postalCode", &address.postal_code),
        ("address.city", &address.city),
        ("address.region", &address.region),
        ("address.country", &address.country),
        ("address.isoCountryCode", &address.iso_country_code),
    ] {
        if let Some(value) = value {
            push(label, value.clone());
        }
    }

    push("latitude", format!("{}°", metadata.latitude));
    push("longitude", format!("{}°", metadata.longitude));
    push("timezone", metadata.timezone.to_string());
    push("date", metadata.date.clone());
    push("time", metadata.time.clone());

    let weather = &metadata.weather;
    push("weather.temperature", weather.temperature.clone());
    push("weather.feelsLike", weather.feels_like.clone());
    push("weather.sunrise", weather.sunrise.clone());
    push("weather.sunset", weather.sunset.clone());
    push("weather.pressure", weather.pressure.clone());
    push("weather.humidity", weather.humidity.clone());
    push("weather.dewPoint", weather.dew_point.clone());
    push("weather.uvIndex", weather.uv_index.clone());
    push("weather.clouds", weather.clouds.clone());
    if let Some(visibility) = &weather.visibility {
        push("weather.visibility", visibility.clone());
    }
    push("weather.windSpeed", weather.wind_speed.clone());
    push("weather.windDegree", weather.wind_degree.clone());
    push(
        "weather.weatherDescription",
        weather.weather_description.clone(),
    );
    push(
        "weather.daylight",
        if weather.is_daytime { "day" } else { "night" }.to_string(),
    );

    for snapshot in &metadata.sensors {
        if let Some(acceleration) = snapshot.acceleration {
            push("sensors.acceleration", acceleration.to_string());
        }
        if let Some(with_gravity) = snapshot.acceleration_including_gravity {
            push(
                "sensors.accelerationIncludingGravity",
                with_gravity.to_string(),
            );
        }
        if let Some(rotation) = snapshot.rotation {
            push("sensors.rotation.alpha", rotation.alpha.to_string());
            push("sensors.rotation.beta", rotation.beta.to_string());
            push("sensors.rotation.gamma", rotation.gamma.to_string());
        }
        if let Some(rate) = snapshot.rotation_rate {
            push("sensors.rotationRate.alpha", rate.alpha.to_string());
            push("sensors.rotationRate.beta", rate.beta.to_string());
            push("sensors.rotationRate.gamma", rate.gamma.to_string());
        }
    }

    rows
}
