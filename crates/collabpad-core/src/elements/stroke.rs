//! Free-hand stroke payload.

use super::{SerializableColor, point_to_polyline_dist};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A committed pen or highlighter stroke.
///
/// Points are in canvas space, relative to the owning element's position
/// (which is the origin when the stroke is first committed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeData {
    /// Captured pointer samples, in order. Always at least two once persisted.
    pub points: Vec<Point>,
    pub color: SerializableColor,
    pub stroke_width: f64,
    /// 1.0 for pen strokes, reduced for highlighter strokes.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl StrokeData {
    /// Bounding box of the sample points, grown by half the stroke width.
    pub fn local_bounds(&self) -> Rect {
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        let rect = iter.fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p));
        let half = self.stroke_width / 2.0;
        rect.inflate(half, half)
    }

    /// Hit-test a point given relative to the element position.
    pub fn hit_test(&self, local: Point, tolerance: f64) -> bool {
        match self.points.as_slice() {
            [] => false,
            [only] => only.distance(local) <= tolerance + self.stroke_width / 2.0,
            points => point_to_polyline_dist(local, points) <= tolerance + self.stroke_width / 2.0,
        }
    }
}
