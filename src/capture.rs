use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bon::bon;
use tracing::{debug, info, warn};

use crate::error::MomentographError;
use crate::location::{resolve_address, LocationService};
use crate::media::{Camera, MediaStore};
use crate::permissions::{check_permissions, PermissionProvider, PermissionStatus};
use crate::records::{CaptureMetadata, CaptureRecord};
use crate::sensors::{MotionSource, SensorAggregator};
use crate::store::RecordStore;
use crate::weather::{CaptureTime, WeatherProvider, WeatherSnapshot};

/// Observable phase of the capture pipeline.
///
/// The capture trigger must be enabled only while the orchestrator is
/// `Idle`; any other state rejects a trigger with
/// [`MomentographError::Busy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Capturing,
    Assembling,
    Committing,
}

/// Coordinates one capture attempt: sensor sampling, location and weather
/// fan-out, the camera shutter, metadata assembly, and the atomic commit of
/// asset plus record.
///
/// Designed to be created once and shared behind an `Arc` for the lifetime
/// of the capture surface.
pub struct CaptureOrchestrator {
    permissions: Arc<dyn PermissionProvider>,
    motion: Arc<dyn MotionSource>,
    location: Arc<dyn LocationService>,
    weather: Arc<dyn WeatherProvider>,
    camera: Arc<dyn Camera>,
    media: Arc<dyn MediaStore>,
    store: Arc<RecordStore>,
    location_timeout: Duration,
    geocode_timeout: Duration,
    weather_timeout: Duration,
    sensor_interval: Duration,
    state: Mutex<CaptureState>,
}

#[bon]
impl CaptureOrchestrator {
    /// Constructs an orchestrator via a builder pattern.
    ///
    /// The platform collaborators (permissions, motion stream, location
    /// service, weather provider, camera, media library) and the record
    /// store are required; the timeout bounds and sensor interval have
    /// defaults matching [`crate::config::Config::new`].
    #[builder]
    pub fn new(
        permissions: Arc<dyn PermissionProvider>,
        motion: Arc<dyn MotionSource>,
        location: Arc<dyn LocationService>,
        weather: Arc<dyn WeatherProvider>,
        camera: Arc<dyn Camera>,
        media: Arc<dyn MediaStore>,
        store: Arc<RecordStore>,
        #[builder(default = Duration::from_secs(10))] location_timeout: Duration,
        #[builder(default = Duration::from_secs(10))] geocode_timeout: Duration,
        #[builder(default = Duration::from_secs(15))] weather_timeout: Duration,
        #[builder(default = Duration::from_millis(16))] sensor_interval: Duration,
    ) -> Self {
        Self {
            permissions,
            motion,
            location,
            weather,
            camera,
            media,
            store,
            location_timeout,
            geocode_timeout,
            weather_timeout,
            sensor_interval,
            state: Mutex::new(CaptureState::Idle),
        }
    }

    /// Current pipeline state, for the capture surface to gate its trigger.
    pub fn state(&self) -> CaptureState {
        *self.lock_state()
    }

    /// Runs one full capture attempt and returns the committed record.
    ///
    /// Failure of any stage aborts the whole attempt: the sensor
    /// subscription is released, nothing partial is persisted, and the
    /// orchestrator re-arms `Idle` so the user can retry.
    ///
    /// # Errors
    ///
    /// * [`MomentographError::Busy`] when a capture is already in flight.
    /// * [`MomentographError::PermissionDenied`] when any capability grant
    ///   is missing.
    /// * [`MomentographError::Timeout`] when location, geocoding, or the
    ///   weather lookup exceed their bounds.
    /// * The failing stage's error otherwise.
    pub async fn capture(&self) -> Result<CaptureRecord, MomentographError> {
        let phase = self.enter_capturing()?;
        debug!("capture triggered");

        if check_permissions(self.permissions.as_ref()).await == PermissionStatus::Denied {
            return Err(MomentographError::PermissionDenied);
        }

        // Sampling stays live until assembly; the handle releases the
        // subscription on every exit path below.
        let aggregator = SensorAggregator::new(Arc::clone(&self.motion), self.sensor_interval);
        let sampling = aggregator.begin_sampling().await;

        let position = with_timeout(
            self.location_timeout,
            "location fix",
            self.location.current_position(),
        )
        .await??;

        // Address and weather are independent; issue both at once and join
        // before assembly.
        let (address, report) = tokio::join!(
            with_timeout(
                self.geocode_timeout,
                "reverse geocoding",
                resolve_address(self.location.as_ref(), &position),
            ),
            with_timeout(
                self.weather_timeout,
                "weather lookup",
                self.weather.fetch(position.latitude, position.longitude),
            ),
        );
        let address = address??;
        let report = report??;

        // The shutter fires while sampling is still live, so the motion data
        // belongs to the capture instant.
        let photo = self.camera.take_picture().await?;

        phase.advance(CaptureState::Assembling);
        let sensors = sampling.end_sampling().await;
        let weather = WeatherSnapshot::from_report(&report)?;
        let capture_time = CaptureTime::from_report(&report)?;

        phase.advance(CaptureState::Committing);
        let asset = self.media.create_asset(&photo).await?;
        let record = CaptureRecord {
            metadata: CaptureMetadata {
                filename: asset.filename.clone(),
                address,
                latitude: position.latitude,
                longitude: position.longitude,
                timezone: capture_time.timezone,
                date: capture_time.date,
                time: capture_time.time,
                weather,
                sensors: vec![sensors],
            },
            asset,
        };

        if let Err(err) = self.store.append(record.clone()).await {
            warn!(
                filename = %record.metadata.filename,
                "record append failed, rolling back created asset"
            );
            if let Err(rollback) = self.media.delete_asset(&record.asset).await {
                warn!(error = %rollback, "asset rollback failed, asset may be orphaned");
            }
            return Err(err.into());
        }

        info!(filename = %record.metadata.filename, "capture committed");
        Ok(record)
    }

    fn enter_capturing(&self) -> Result<PhaseGuard<'_>, MomentographError> {
        let mut state = self.lock_state();
        if *state != CaptureState::Idle {
            return Err(MomentographError::Busy);
        }
        *state = CaptureState::Capturing;
        Ok(PhaseGuard { state: &self.state })
    }

    fn lock_state(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Re-arms `Idle` when the capture attempt ends, success or failure.
struct PhaseGuard<'a> {
    state: &'a Mutex<CaptureState>,
}

impl PhaseGuard<'_> {
    fn advance(&self, next: CaptureState) {
        *self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = CaptureState::Idle;
    }
}

async fn with_timeout<T>(
    limit: Duration,
    stage: &'static str,
    operation: impl Future<Output = T>,
) -> Result<T, MomentographError> {
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_| MomentographError::Timeout {
            stage,
            timeout_ms: limit.as_millis() as u64,
        })
}
