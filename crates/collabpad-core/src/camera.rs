//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom level the canvas accepts.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom level the canvas accepts.
pub const MAX_ZOOM: f64 = 5.0;

/// Camera manages the view transform for the canvas.
///
/// Screen space is the pointer space of the host surface, canvas space is the
/// space elements live in. `canvas = (screen - offset) / zoom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level, always inside `[min_zoom, max_zoom]`.
    zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with custom zoom limits.
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        }
    }

    /// Current zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom level. The value is clamped on every write.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_nan() {
            return;
        }
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Get the affine transform for rendering (canvas -> screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling (screen -> canvas).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        to_canvas(screen_point, self.zoom, self.offset)
    }

    /// Convert a canvas point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Convert a canvas rectangle to screen coordinates.
    pub fn world_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.world_to_screen(Point::new(rect.x0, rect.y0)),
            self.world_to_screen(Point::new(rect.x1, rect.y1)),
        )
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Set the pan offset directly.
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Zoom to `new_zoom`, keeping the canvas point under `screen_point` fixed.
    ///
    /// Returns false when the clamped zoom equals the current one.
    pub fn zoom_at(&mut self, screen_point: Point, new_zoom: f64) -> bool {
        if new_zoom.is_nan() {
            return false;
        }
        let new_zoom = new_zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }

        let old_zoom = self.zoom;
        let cursor = screen_point.to_vec2();
        self.offset = cursor - (cursor - self.offset) / old_zoom * new_zoom;
        self.zoom = new_zoom;
        true
    }

    /// Apply one wheel notch at `screen_point`.
    ///
    /// Scrolling down (`delta_y > 0`) zooms out by `step`, anything else zooms in.
    pub fn wheel_zoom(&mut self, screen_point: Point, delta_y: f64, step: f64) -> bool {
        let direction = if delta_y > 0.0 { -1.0 } else { 1.0 };
        self.zoom_at(screen_point, self.zoom + direction * step)
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }
}

/// Convert a screen point to canvas space for a given zoom and pan.
pub fn to_canvas(screen_point: Point, zoom: f64, pan: Vec2) -> Point {
    Point::new(
        (screen_point.x - pan.x) / zoom,
        (screen_point.y - pan.y) / zoom,
    )
}
