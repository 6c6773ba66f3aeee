//! Selection handles and move/resize/rotate manipulation.

use crate::elements::{Element, ElementId, ElementKind, ElementPatch, rotate_point};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 10.0;
/// Distance from the top edge to the rotation handle, in canvas units.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Box corner, resizes.
    Corner(Corner),
    /// Far end of an arrow or line, changes its length.
    Endpoint,
    /// Above the top edge, rotates around the center.
    Rotate,
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// `tolerance` should already be divided by the camera zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance(point) <= tolerance
    }
}

/// Get the selection handles for an element.
pub fn get_handles(element: &Element) -> Vec<Handle> {
    let bounds = element.bounds();
    let center = bounds.center();
    let place = |p: Point| rotate_point(p, center, element.rotation);
    let rotate = Handle::new(
        place(Point::new(center.x, bounds.y0 - ROTATE_HANDLE_OFFSET)),
        HandleKind::Rotate,
    );

    match &element.kind {
        ElementKind::Stroke(_) => Vec::new(),
        ElementKind::Text(_) => vec![rotate],
        ElementKind::Shape(shape) if shape.shape.is_linear() => vec![
            Handle::new(place(Point::new(bounds.x1, bounds.y0)), HandleKind::Endpoint),
            rotate,
        ],
        _ => vec![
            Handle::new(
                place(Point::new(bounds.x0, bounds.y0)),
                HandleKind::Corner(Corner::TopLeft),
            ),
            Handle::new(
                place(Point::new(bounds.x1, bounds.y0)),
                HandleKind::Corner(Corner::TopRight),
            ),
            Handle::new(
                place(Point::new(bounds.x0, bounds.y1)),
                HandleKind::Corner(Corner::BottomLeft),
            ),
            Handle::new(
                place(Point::new(bounds.x1, bounds.y1)),
                HandleKind::Corner(Corner::BottomRight),
            ),
            rotate,
        ],
    }
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(element: &Element, point: Point, tolerance: f64) -> Option<HandleKind> {
    get_handles(element)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.kind)
}

/// Transient transform shown while a handle is dragged.
///
/// Never stored on an element: on release it is baked into width, height,
/// position and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformPreview {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Unrotated box the element will occupy once baked.
    pub bounds: Rect,
}

/// State of an active drag on the selected element.
#[derive(Debug, Clone)]
pub struct ManipulationState {
    pub element_id: ElementId,
    /// The handle being dragged (None = moving the whole element).
    pub handle: Option<HandleKind>,
    /// Starting point of the drag, canvas space.
    pub start_point: Point,
    pub current_point: Point,
    /// Element as it was when the drag began.
    pub original: Element,
}

impl ManipulationState {
    pub fn new(original: &Element, handle: Option<HandleKind>, start_point: Point) -> Self {
        Self {
            element_id: original.id(),
            handle,
            start_point,
            current_point: start_point,
            original: original.clone(),
        }
    }

    pub fn update(&mut self, point: Point) {
        self.current_point = point;
    }

    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Whether the pointer actually moved.
    pub fn has_moved(&self) -> bool {
        self.delta().hypot2() > f64::EPSILON
    }

    /// Position of the element for a whole-element move.
    pub fn moved_position(&self) -> Point {
        self.original.position + self.delta()
    }

    /// Rotation in degrees implied by the pointer, 0° pointing up.
    ///
    /// `snap` rounds to 15° steps.
    fn rotation_at(&self, snap: bool) -> f64 {
        let center = self.original.center();
        let d = self.current_point - center;
        let mut angle = d.y.atan2(d.x).to_degrees() + 90.0;
        if snap {
            angle = (angle / 15.0).round() * 15.0;
        }
        angle.rem_euclid(360.0)
    }

    /// Box after applying the drag to a resize handle, in canvas space
    /// (before rotation). Sizes are clamped to `min_size`.
    fn resized_bounds(&self, min_size: f64, keep_aspect_ratio: bool) -> Rect {
        let original = self.original.bounds();
        let rotation = self.original.rotation;
        let center = original.center();
        // Drag vector in the element's own frame.
        let local = rotate_point(self.current_point, center, -rotation)
            - rotate_point(self.start_point, center, -rotation);

        let local_rect = match self.handle {
            Some(HandleKind::Corner(corner)) => {
                let (dx, dy) = (
                    if corner.is_left() { -local.x } else { local.x },
                    if corner.is_top() { -local.y } else { local.y },
                );
                let mut width = (original.width() + dx).max(min_size);
                let mut height = (original.height() + dy).max(min_size);
                if keep_aspect_ratio && original.height() > 0.0 {
                    let aspect = original.width() / original.height();
                    width = width.max(height * aspect);
                    height = width / aspect;
                }
                let x0 = if corner.is_left() { original.x1 - width } else { original.x0 };
                let y0 = if corner.is_top() { original.y1 - height } else { original.y0 };
                Rect::from_origin_size((x0, y0), (width, height))
            }
            Some(HandleKind::Endpoint) => {
                let length = (original.width() + local.x).max(min_size);
                Rect::from_origin_size(original.origin(), (length, original.height()))
            }
            _ => original,
        };

        // Keep the anchor fixed on screen by rotating the new center back out.
        let new_center = rotate_point(local_rect.center(), center, rotation);
        Rect::from_center_size(new_center, local_rect.size())
    }

    /// Current transient transform, for rendering.
    pub fn preview(&self, min_size: f64, keep_aspect_ratio: bool) -> TransformPreview {
        let original = self.original.bounds();
        match self.handle {
            None => TransformPreview {
                scale_x: 1.0,
                scale_y: 1.0,
                rotation: self.original.rotation,
                bounds: original + self.delta(),
            },
            Some(HandleKind::Rotate) => TransformPreview {
                scale_x: 1.0,
                scale_y: 1.0,
                rotation: self.rotation_at(keep_aspect_ratio),
                bounds: original,
            },
            Some(_) => {
                let bounds = self.resized_bounds(min_size, keep_aspect_ratio);
                TransformPreview {
                    scale_x: ratio(bounds.width(), original.width()),
                    scale_y: ratio(bounds.height(), original.height()),
                    rotation: self.original.rotation,
                    bounds,
                }
            }
        }
    }

    /// Fold the drag into plain geometry, ready for `update_element`.
    pub fn bake(&self, min_size: f64, keep_aspect_ratio: bool) -> ElementPatch {
        match self.handle {
            None => ElementPatch::moved_to(self.moved_position()),
            Some(HandleKind::Rotate) => ElementPatch {
                rotation: Some(self.rotation_at(keep_aspect_ratio)),
                ..ElementPatch::default()
            },
            Some(_) => {
                let bounds = self.resized_bounds(min_size, keep_aspect_ratio);
                let Size { width, height } = bounds.size();
                ElementPatch {
                    position: Some(bounds.origin()),
                    width: Some(width),
                    height: Some(height),
                    ..ElementPatch::default()
                }
            }
        }
    }
}

fn ratio(new: f64, old: f64) -> f64 {
    if old.abs() < f64::EPSILON { 1.0 } else { new / old }
}
