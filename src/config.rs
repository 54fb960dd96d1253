/// Application settings
///
/// Stored as JSON in the user data directory. A missing file means defaults;
/// a malformed file is reported and replaced by defaults rather than aborting
/// the app.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::state::data::Coordinate;

/// Seconds the device geolocation fix is allowed to take before the resolver
/// falls through to the manual map pin
const DEFAULT_GEOLOCATION_TIMEOUT_SECS: u64 = 5;

/// Default map center: Biratnagar
const DEFAULT_CENTER_LAT: f64 = 26.4525;
const DEFAULT_CENTER_LNG: f64 = 87.2718;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Where the map opens before any pin is placed
    pub default_center_lat: f64,
    pub default_center_lng: f64,
    /// Bound on the one-shot device geolocation fix
    pub geolocation_timeout_secs: u64,
    /// Directory holding the classification model; None = app data directory
    pub models_dir: Option<PathBuf>,
    /// Directory the simulated camera reads frames from; None = camera disabled
    pub camera_frames_dir: Option<PathBuf>,
    /// Known device position for kiosk installs; None = no location source,
    /// so the resolver falls through to the manual pin
    pub kiosk_position: Option<Coordinate>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_center_lat: DEFAULT_CENTER_LAT,
            default_center_lng: DEFAULT_CENTER_LNG,
            geolocation_timeout_secs: DEFAULT_GEOLOCATION_TIMEOUT_SECS,
            models_dir: None,
            camera_frames_dir: None,
            kiosk_position: None,
        }
    }
}

impl AppConfig {
    /// Path of the settings file:
    /// ~/.local/share/civic-reporter/settings.json (Linux)
    pub fn settings_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(|| dirs::home_dir())
            .expect("Could not determine user data directory");

        path.push("civic-reporter");
        path.push("settings.json");
        path
    }

    /// Directory the classification model is loaded from
    ///
    /// Model assets are machine-local (downloaded per install, never synced),
    /// so the default lives in the local data directory.
    pub fn resolved_models_dir(&self) -> PathBuf {
        self.models_dir.clone().unwrap_or_else(|| {
            let mut path = dirs_next::data_local_dir()
                .or_else(|| dirs_next::home_dir())
                .expect("Could not determine local data directory");
            path.push("civic-reporter");
            path.push("models");
            path
        })
    }

    /// Load settings, falling back to defaults on a missing or broken file
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("⚠️  Ignoring malformed settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::settings_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json().expect("settings always serialize");
        std::fs::write(path, json)
    }

    /// Convert to JSON string for storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn geolocation_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.geolocation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut config = AppConfig::default();
        config.geolocation_timeout_secs = 8;
        config.camera_frames_dir = Some(PathBuf::from("/tmp/frames"));

        let json = config.to_json().unwrap();
        let restored = AppConfig::from_json(&json).unwrap();

        assert_eq!(config, restored);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let mut path = std::env::temp_dir();
        path.push(format!("civic-reporter-bad-settings-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config, AppConfig::default());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_models_dir_override_wins() {
        let mut config = AppConfig::default();
        assert!(config.resolved_models_dir().ends_with("civic-reporter/models"));

        config.models_dir = Some(PathBuf::from("/opt/civic/models"));
        assert_eq!(config.resolved_models_dir(), PathBuf::from("/opt/civic/models"));
    }

    #[test]
    fn test_default_center_is_biratnagar() {
        let config = AppConfig::default();
        assert!((config.default_center_lat - 26.4525).abs() < 1e-9);
        assert!((config.default_center_lng - 87.2718).abs() < 1e-9);
    }
}
