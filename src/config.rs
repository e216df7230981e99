//! Application configuration
//!
//! Values can be overridden through environment variables.

use bevy::prelude::*;
use std::path::PathBuf;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[derive(Resource, Clone, Debug)]
pub struct NfzConfig {
    /// Directory holding the bundled `.geojson` datasets and pattern images
    pub datasets_dir: PathBuf,
    /// Where preferences live; `None` means the platform config directory
    pub preferences_dir: Option<PathBuf>,
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: f64,
    pub min_zoom: f64,
}

impl Default for NfzConfig {
    fn default() -> Self {
        Self {
            datasets_dir: std::env::var("NFZ_DATASETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("assets/datasets")),
            preferences_dir: std::env::var("NFZ_PREFS_DIR").ok().map(PathBuf::from),
            // New York
            center_latitude: env_parse("NFZ_CENTER_LAT").unwrap_or(40.7128),
            center_longitude: env_parse("NFZ_CENTER_LON").unwrap_or(-74.0060),
            zoom: env_parse("NFZ_ZOOM").unwrap_or(7.0),
            min_zoom: env_parse("NFZ_MIN_ZOOM").unwrap_or(4.0),
        }
    }
}

impl NfzConfig {
    /// Initial zoom, never below the minimum
    pub fn initial_zoom(&self) -> f64 {
        self.zoom.max(self.min_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_zoom_respects_minimum() {
        let config = NfzConfig {
            zoom: 2.0,
            min_zoom: 4.0,
            ..NfzConfig::default()
        };
        assert_eq!(config.initial_zoom(), 4.0);

        let config = NfzConfig {
            zoom: 9.5,
            ..config
        };
        assert_eq!(config.initial_zoom(), 9.5);
    }
}
