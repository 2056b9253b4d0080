use async_trait::async_trait;

/// Capabilities the capture pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Camera,
    Motion,
    ForegroundLocation,
    MediaLibrary,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Camera,
        Capability::Motion,
        Capability::ForegroundLocation,
        Capability::MediaLibrary,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Platform permission dialogs.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Requests a single capability grant, prompting the user if the
    /// platform requires it.
    async fn request(&self, capability: Capability) -> PermissionStatus;
}

/// Requests every capture capability and reports `Granted` only when all of
/// them are granted.
///
/// All capabilities are requested even after a denial so the user sees every
/// outstanding prompt in one pass. Grants can be revoked externally between
/// sessions, so callers re-evaluate this whenever the capture surface
/// regains focus.
pub async fn check_permissions(provider: &dyn PermissionProvider) -> PermissionStatus {
    let mut granted = true;
    for capability in Capability::ALL {
        if provider.request(capability).await == PermissionStatus::Denied {
            granted = false;
        }
    }
    if granted {
        PermissionStatus::Granted
    } else {
        PermissionStatus::Denied
    }
}
