use std::path::{Path, PathBuf};

use egui::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable pointing at a JSON config file
pub const CONFIG_ENV_VAR: &str = "PAGE_COMPOSER_CONFIG";

/// Editor settings. Persisted through eframe storage between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct EditorConfig {
    /// Page width in px (A4 at 72 dpi)
    pub page_width: f32,
    /// Page height in px (A4 at 72 dpi)
    pub page_height: f32,
    /// Snap grid used while dragging
    pub grid_size: f32,
    pub zoom_min: u32,
    pub zoom_max: u32,
    pub zoom_step: u32,
    /// Pixel density multiplier used when rasterizing for export
    pub export_scale: f32,
    /// Where exported PDFs are written. Current directory when unset.
    pub export_dir: Option<PathBuf>,
    /// Maximum number of history snapshots kept
    pub history_limit: usize,
    /// Directory for periodic autosaves. Autosave is off when unset.
    pub autosave_dir: Option<PathBuf>,
    /// Seconds between autosaves
    pub autosave_interval: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            grid_size: 10.0,
            zoom_min: 25,
            zoom_max: 200,
            zoom_step: 25,
            export_scale: 2.0,
            export_dir: None,
            history_limit: 200,
            autosave_dir: None,
            autosave_interval: 60,
        }
    }
}

impl EditorConfig {
    pub fn page_size(&self) -> Vec2 {
        Vec2::new(self.page_width, self.page_height)
    }

    /// Load a config from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the editor can't work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if !(self.page_width > 0.0 && self.page_height > 0.0) {
            return invalid(format!(
                "page size must be positive, got {}x{}",
                self.page_width, self.page_height
            ));
        }
        if self.zoom_min == 0 || self.zoom_min > self.zoom_max {
            return invalid(format!(
                "zoom range {}..={} is empty",
                self.zoom_min, self.zoom_max
            ));
        }
        if self.zoom_step == 0 {
            return invalid("zoom_step must be at least 1".to_owned());
        }
        if !(self.export_scale > 0.0) {
            return invalid(format!("export_scale must be positive, got {}", self.export_scale));
        }
        if !(self.grid_size >= 0.0) {
            return invalid(format!("grid_size must not be negative, got {}", self.grid_size));
        }
        Ok(())
    }

    /// Load the config named by `PAGE_COMPOSER_CONFIG`, if set.
    ///
    /// Returns `None` when the variable is unset or the file can't be loaded;
    /// load failures are logged.
    pub fn from_env() -> Option<Self> {
        let path = std::env::var_os(CONFIG_ENV_VAR)?;
        let path = PathBuf::from(path);
        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(err) => {
                log::error!("Ignoring config {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Clamp a zoom percentage into the configured range
    pub fn clamp_zoom(&self, zoom: u32) -> u32 {
        // never panics, even on a reversed range
        zoom.max(self.zoom_min).min(self.zoom_max)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{ "grid_size": 5.0 }"#).unwrap();
        assert_eq!(config.grid_size, 5.0);
        assert_eq!(config.page_width, 595.0);
        assert_eq!(config.history_limit, 200);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "export_scale": 3.0, "zoom_max": 300 }"#).unwrap();

        let config = EditorConfig::from_file(&path).unwrap();
        assert_eq!(config.export_scale, 3.0);
        assert_eq!(config.clamp_zoom(400), 300);
        assert_eq!(config.clamp_zoom(10), 25);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(EditorConfig::from_file(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_reversed_zoom_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "zoom_min": 300, "zoom_max": 100 }"#).unwrap();
        assert!(matches!(EditorConfig::from_file(&path), Err(ConfigError::Invalid(_))));

        let reversed = EditorConfig {
            zoom_min: 300,
            zoom_max: 100,
            ..Default::default()
        };
        assert!(reversed.validate().is_err());
        assert_eq!(reversed.clamp_zoom(100), 100);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let zero_step = EditorConfig {
            zoom_step: 0,
            ..Default::default()
        };
        assert!(zero_step.validate().is_err());
        let flat = EditorConfig {
            page_height: 0.0,
            ..Default::default()
        };
        assert!(flat.validate().is_err());
        assert!(EditorConfig::default().validate().is_ok());
    }
}
