use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// A 3-axis sensor vector.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Euclidean magnitude of the vector.
    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Device orientation angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Rotation {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// One raw sample from the device motion stream.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionReading {
    pub acceleration: Vec3,
    pub acceleration_including_gravity: Vec3,
    pub rotation: Rotation,
    pub rotation_rate: Rotation,
}

/// Point-in-time summary of the motion stream, reduced for persistence:
/// acceleration vectors collapse to their scalar magnitudes, rotation and
/// rotation rate pass through per axis.
///
/// Every field is `None` when no sample arrived during the capture window.
/// Absent motion data is never reported as zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSnapshot {
    pub acceleration: Option<f64>,
    pub acceleration_including_gravity: Option<f64>,
    pub rotation: Option<Rotation>,
    pub rotation_rate: Option<Rotation>,
}

impl SensorSnapshot {
    fn from_reading(reading: &MotionReading) -> Self {
        Self {
            acceleration: Some(reading.acceleration.magnitude()),
            acceleration_including_gravity: Some(
                reading.acceleration_including_gravity.magnitude(),
            ),
            rotation: Some(reading.rotation),
            rotation_rate: Some(reading.rotation_rate),
        }
    }
}

/// Platform motion sensor stream.
///
/// `subscribe` starts sample delivery at the requested interval. The
/// platform side must stop delivering and close the channel once
/// `unsubscribe` is called.
#[async_trait]
pub trait MotionSource: Send + Sync {
    async fn subscribe(&self, interval: Duration) -> mpsc::Receiver<MotionReading>;
    fn unsubscribe(&self);
}

/// Collects instantaneous motion samples over a capture window.
pub struct SensorAggregator {
    source: Arc<dyn MotionSource>,
    interval: Duration,
}

impl SensorAggregator {
    pub fn new(source: Arc<dyn MotionSource>, interval: Duration) -> Self {
        Self { source, interval }
    }

    /// Subscribes to the motion stream and starts retaining the most recent
    /// sample. No history is buffered.
    pub async fn begin_sampling(&self) -> SamplingHandle {
        let mut samples = self.source.subscribe(self.interval).await;
        let (latest_tx, latest_rx) = watch::channel(None);
        let task = tokio::spawn(async move {
            while let Some(reading) = samples.recv().await {
                if latest_tx.send(Some(reading)).is_err() {
                    break;
                }
            }
        });
        SamplingHandle {
            latest: latest_rx,
            task,
            source: Arc::clone(&self.source),
            released: false,
        }
    }
}

/// A live sampling window.
///
/// The underlying subscription is released exactly once per window: either
/// by [`SamplingHandle::end_sampling`] or, on early-return paths, by `Drop`.
pub struct SamplingHandle {
    latest: watch::Receiver<Option<MotionReading>>,
    task: JoinHandle<()>,
    source: Arc<dyn MotionSource>,
    released: bool,
}

impl SamplingHandle {
    /// Stops sampling and reduces the retained sample to a snapshot.
    pub async fn end_sampling(mut self) -> SensorSnapshot {
        self.released = true;
        self.source.unsubscribe();
        // The forwarder drains samples already queued, then exits once the
        // platform side closes the channel.
        let _ = (&mut self.task).await;
        self.latest
            .borrow()
            .as_ref()
            .map(SensorSnapshot::from_reading)
            .unwrap_or_default()
    }
}

impl Drop for SamplingHandle {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            self.task.abort();
            self.source.unsubscribe();
        }
    }
}
