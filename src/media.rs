use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("camera capture failed: {0}")]
    CaptureDevice(String),

    #[error("asset creation failed: {0}")]
    AssetCreate(String),

    #[error("asset deletion failed: {0}")]
    AssetDelete(String),
}

/// An image freshly produced by the camera, not yet in the media library.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Photo {
    pub uri: String,
}

/// Reference to an image stored in the external media library.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub uri: String,
    /// Last path segment of the URI; the natural key for record lookup.
    pub filename: String,
}

impl AssetRef {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let filename = uri.rsplit('/').next().unwrap_or_default().to_string();
        Self { uri, filename }
    }
}

/// Platform camera shutter.
#[async_trait]
pub trait Camera: Send + Sync {
    async fn take_picture(&self) -> Result<Photo, MediaError>;
}

/// Platform media library owning the stored image assets.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn create_asset(&self, photo: &Photo) -> Result<AssetRef, MediaError>;
    async fn delete_asset(&self, asset: &AssetRef) -> Result<(), MediaError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Media library fake that records created and deleted assets and can be
    /// scripted to fail either operation.
    #[derive(Default)]
    pub(crate) struct RecordingMediaStore {
        pub(crate) fail_create: bool,
        pub(crate) fail_delete: bool,
        pub(crate) created: Mutex<Vec<AssetRef>>,
        pub(crate) deleted: Mutex<Vec<String>>,
    }

    impl RecordingMediaStore {
        pub(crate) fn failing_create() -> Self {
            Self {
                fail_create: true,
                ..Self::default()
            }
        }

        pub(crate) fn failing_delete() -> Self {
            Self {
                fail_delete: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl MediaStore for RecordingMediaStore {
        async fn create_asset(&self, photo: &Photo) -> Result<AssetRef, MediaError> {
            if self.fail_create {
                return Err(MediaError::AssetCreate(
                    "media library rejected the photo".to_string(),
                ));
            }
            let asset = AssetRef::from_uri(photo.uri.clone());
            self.created.lock().unwrap().push(asset.clone());
            Ok(asset)
        }

        async fn delete_asset(&self, asset: &AssetRef) -> Result<(), MediaError> {
            if self.fail_delete {
                return Err(MediaError::AssetDelete(format!(
                    "could not delete {}",
                    asset.filename
                )));
            }
            self.deleted.lock().unwrap().push(asset.filename.clone());
            Ok(())
        }
    }
}
