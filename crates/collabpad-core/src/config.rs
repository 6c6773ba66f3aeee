//! Tunable constants for the canvas.

use crate::camera::{MAX_ZOOM, MIN_ZOOM};
use crate::elements::{DEFAULT_SHAPE_SIZE, STICKY_SIZE};
use crate::history::MAX_UNDO_HISTORY;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Key the document blob is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "collabpad-storage";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Canvas configuration.
///
/// Missing fields in a config file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom change per wheel notch.
    pub wheel_zoom_step: f64,
    /// Snapshots kept per page.
    pub history_limit: usize,
    /// Hit-test slack in screen pixels, divided by zoom before use.
    pub hit_tolerance: f64,
    /// Slack for grabbing selection handles, in screen pixels.
    pub handle_tolerance: f64,
    /// Eraser reach in screen pixels.
    pub eraser_radius: f64,
    pub sticky_size: Size,
    pub shape_size: f64,
    /// Smallest width/height a resize can produce.
    pub min_element_size: f64,
    /// Uploaded images are shrunk to fit this box.
    pub image_fit: Size,
    /// Where uploaded images are placed.
    pub image_position: Point,
    pub highlighter_width_multiplier: f64,
    pub highlighter_opacity: f64,
    pub storage_key: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            wheel_zoom_step: 0.1,
            history_limit: MAX_UNDO_HISTORY,
            hit_tolerance: 5.0,
            handle_tolerance: 12.0,
            eraser_radius: 10.0,
            sticky_size: STICKY_SIZE,
            shape_size: DEFAULT_SHAPE_SIZE,
            min_element_size: 20.0,
            image_fit: Size::new(400.0, 400.0),
            image_position: Point::new(100.0, 100.0),
            highlighter_width_multiplier: 2.0,
            highlighter_opacity: 0.4,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl CanvasConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
