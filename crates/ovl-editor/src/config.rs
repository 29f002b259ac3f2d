//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the editing core.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Snapshots kept for undo/redo. Default: **20**.
    pub history_capacity: usize,

    /// Offset applied to a duplicate relative to its source. Default: **(20, 20)**.
    pub duplicate_offset: (f64, f64),

    /// Largest canvas a background image is fitted into. Default: **1200 × 800**.
    pub max_canvas_width: f64,
    pub max_canvas_height: f64,

    /// Canvas size before any background is set. Default: **800 × 600**.
    pub default_canvas_width: f64,
    pub default_canvas_height: f64,

    /// Prefix for minted element ids. Default: **"text"**.
    pub id_prefix: String,

    /// Content and font of newly added text.
    pub default_text: String,
    pub default_font_family: String,
    pub default_font_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: crate::history::HISTORY_CAPACITY,
            duplicate_offset: (20.0, 20.0),
            max_canvas_width: 1200.0,
            max_canvas_height: 800.0,
            default_canvas_width: 800.0,
            default_canvas_height: 600.0,
            id_prefix: "text".into(),
            default_text: "Double click to edit".into(),
            default_font_family: "Arial".into(),
            default_font_size: 32.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = EditorConfig::from_json_str(r#"{ "historyCapacity": 5 }"#).unwrap();
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.duplicate_offset, (20.0, 20.0));
        assert_eq!(config.id_prefix, "text");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let err = EditorConfig::from_json_str("{ historyCapacity: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("ovl-editor-config-does-not-exist.json");
        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config, EditorConfig::default());
    }
}
