//! # Momentograph
//!
//! Capture photographs together with the context they were taken in: a
//! reverse-geocoded address, a weather snapshot, and device-motion readings,
//! assembled into one record and persisted for later browsing and deletion.
//!
//! ## Key Features
//!
//! - **Capture orchestration**: one trigger fans out to the motion stream,
//!   the location service, and the weather endpoint, then commits a single
//!   [`records::CaptureRecord`] atomically. Partial results are never
//!   persisted.
//! - **Sensor aggregation**: instantaneous motion samples reduced to scalar
//!   acceleration magnitudes and per-axis rotation, with absent samples
//!   reported as missing rather than zero.
//! - **Location & weather clients**: typed address candidates and a one-call
//!   weather lookup whose display fields are localized with the snapshot's
//!   own timezone offset.
//! - **Record store**: a durable JSON list with append, list, find-by-
//!   filename, and delete, serialized against concurrent mutation.
//! - **Gallery boundary**: flattened metadata rows and a confirm/cancel
//!   delete flow that also removes the underlying media asset.
//!
//! The platform pieces (camera shutter, media library, permission dialogs,
//! GPS, motion sensors) stay behind traits so the pipeline can be embedded
//! on any device shell and exercised in tests with fakes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use momentograph::store::RecordStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), momentograph::MomentographError> {
//!     let store = RecordStore::new("momentograph-records.json");
//!     for record in store.list_all().await? {
//!         println!(
//!             "{}: {} at {}",
//!             record.metadata.filename, record.metadata.address, record.metadata.time
//!         );
//!     }
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod gallery;
pub mod location;
pub mod media;
pub mod permissions;
pub mod records;
pub mod sensors;
pub mod settings;
pub mod store;
pub mod weather;

pub use capture::{CaptureOrchestrator, CaptureState};
pub use error::MomentographError;
pub use records::{CaptureMetadata, CaptureRecord};
