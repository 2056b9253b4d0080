use thiserror::Error;

use crate::config::ConfigError;
use crate::location::LocationError;
use crate::media::MediaError;
use crate::store::StoreError;
use crate::weather::WeatherError;

/// The primary error type for the momentograph crate.
#[derive(Error, Debug)]
pub enum MomentographError {
    #[error("required capture permissions were not granted")]
    PermissionDenied,

    /// A capture trigger arrived while another capture was in flight.
    /// The trigger is rejected, never queued.
    #[error("a capture is already in flight")]
    Busy,

    // --- Module Errors ---
    #[error("location resolution failed: {0}")]
    Location(#[from] LocationError),

    #[error("weather lookup failed: {0}")]
    Weather(#[from] WeatherError),

    #[error("capture device or media library failed: {0}")]
    Media(#[from] MediaError),

    #[error("record store failure: {0}")]
    Storage(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An external call exceeded its configured bound. Bounding every
    /// suspension point keeps a capture attempt from hanging forever.
    #[error("{stage} did not complete within {timeout_ms} ms")]
    Timeout { stage: &'static str, timeout_ms: u64 },
}
