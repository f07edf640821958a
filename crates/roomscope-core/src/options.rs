//! Configuration options for roomscope.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Global configuration options for the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Tint applied to a mesh under the pointer.
    pub hover_color: Vec3,

    /// Tint applied to the selected (or emphasized) meshes.
    pub selected_color: Vec3,

    /// Quiet period before assignment edits are written to the simulation record.
    pub save_debounce_ms: u64,

    /// Whether mesh selection is also ignored while a marker transform gesture is active.
    pub suppress_picking_while_transforming: bool,

    /// Minimum ray parameter accepted as a hit.
    pub pick_epsilon: f32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            hover_color: Vec3::new(0.55, 0.75, 1.0),
            selected_color: Vec3::new(0.2, 0.8, 0.3),
            save_debounce_ms: 300,
            suppress_picking_while_transforming: false,
            pick_epsilon: 1e-6,
        }
    }
}

impl Options {
    /// Parses options from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Returns the debounce delay as a [`std::time::Duration`].
    pub fn save_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.save_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.save_debounce_ms, 300);
        assert!(!options.suppress_picking_while_transforming);
        assert_ne!(options.hover_color, options.selected_color);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = Options::from_json_str(r#"{ "save_debounce_ms": 50 }"#).unwrap();
        assert_eq!(options.save_debounce_ms, 50);
        assert_eq!(options.selected_color, Options::default().selected_color);
    }

    #[test]
    fn test_color_from_json() {
        let options = Options::from_json_str(r#"{ "hover_color": [1.0, 0.0, 0.5] }"#).unwrap();
        assert_eq!(options.hover_color, Vec3::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Options::from_json_str("{ not json").is_err());
    }
}
