use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Key names are part of the persisted format; renaming them would orphan
// settings written by earlier versions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PresentationSettings {
    #[serde(rename = "darkMode", default)]
    dark_mode: bool,
}

/// Persisted presentation settings, shared explicitly with the screens that
/// need them instead of living in process-global state.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<PresentationSettings>,
}

impl SettingsStore {
    /// Opens the settings file, falling back to defaults when it does not
    /// exist or cannot be parsed.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = std::fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default();
        Self {
            path,
            data: RwLock::new(data),
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .dark_mode
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), SettingsError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.dark_mode = enabled;
        self.persist(&data)
    }

    /// Re-reads the file; presentation components call this on focus to pick
    /// up changes made elsewhere.
    pub fn reload(&self) -> Result<(), SettingsError> {
        let contents = std::fs::read_to_string(&self.path)?;
        let parsed: PresentationSettings = serde_json::from_str(&contents)?;
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = parsed;
        Ok(())
    }

    fn persist(&self, data: &PresentationSettings) -> Result<(), SettingsError> {
        let serialized = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_light_mode() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json"));
        assert!(!store.dark_mode());
    }

    #[test]
    fn test_dark_mode_survives_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::open(&path);
        store.set_dark_mode(true).unwrap();

        let reopened = SettingsStore::open(&path);
        assert!(reopened.dark_mode());
    }

    #[test]
    fn test_persisted_key_matches_original_app() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        SettingsStore::open(&path).set_dark_mode(true).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"darkMode\": true"));
    }

    #[test]
    fn test_reload_picks_up_external_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::open(&path);
        assert!(!store.dark_mode());

        std::fs::write(&path, r#"{"darkMode": true}"#).unwrap();
        store.reload().unwrap();
        assert!(store.dark_mode());
    }
}
