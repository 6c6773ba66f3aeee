//! Geometric shape payload (rectangle, circle, arrow, line).

use super::SerializableColor;
use serde::{Deserialize, Serialize};

/// Default edge length for shapes placed with a single click.
pub const DEFAULT_SHAPE_SIZE: f64 = 100.0;

/// Kind of primitive a shape element draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Arrow,
    Line,
}

impl ShapeKind {
    /// Arrows and lines are one-dimensional: `width` is their length, `height` is 0.
    pub fn is_linear(self) -> bool {
        matches!(self, ShapeKind::Arrow | ShapeKind::Line)
    }

    /// Default `(width, height)` for a freshly placed shape of this kind.
    pub fn default_size(self, size: f64) -> (f64, f64) {
        if self.is_linear() { (size, 0.0) } else { (size, size) }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Arrow => "arrow",
            ShapeKind::Line => "line",
        }
    }
}

/// Payload of a shape element. The bounding box lives on the element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeData {
    pub shape: ShapeKind,
    pub color: SerializableColor,
    pub stroke_width: f64,
}
