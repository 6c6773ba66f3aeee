//! Drawable elements placed on a page.

mod color;
mod image;
mod shape;
mod sticky;
mod stroke;
mod text;

pub use color::{ColorParseError, SerializableColor};
pub use image::{ImageData, ImageFormat, fit_within};
pub use shape::{DEFAULT_SHAPE_SIZE, ShapeData, ShapeKind};
pub use sticky::{DEFAULT_STICKY_TEXT, STICKY_SIZE, StickyData};
pub use stroke::StrokeData;
pub use text::{DEFAULT_TEXT, TextData, measure_text};

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Rotate `point` around `center` by `degrees` (clockwise in screen space).
pub fn rotate_point(point: Point, center: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return point;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - center;
    center + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Variant-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Stroke(StrokeData),
    Shape(ShapeData),
    Text(TextData),
    Sticky(StickyData),
    Image(ImageData),
}

impl ElementKind {
    /// Serialized tag of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Stroke(_) => "stroke",
            ElementKind::Shape(_) => "shape",
            ElementKind::Text(_) => "text",
            ElementKind::Sticky(_) => "sticky",
            ElementKind::Image(_) => "image",
        }
    }

    /// Box used when a draft does not specify one.
    pub fn default_size(&self) -> (Option<f64>, Option<f64>) {
        match self {
            ElementKind::Sticky(_) => (Some(STICKY_SIZE.width), Some(STICKY_SIZE.height)),
            ElementKind::Shape(shape) => {
                let (w, h) = shape.shape.default_size(DEFAULT_SHAPE_SIZE);
                (Some(w), Some(h))
            }
            ElementKind::Stroke(_) | ElementKind::Text(_) | ElementKind::Image(_) => (None, None),
        }
    }

    /// Editable text content, for text and sticky elements.
    pub fn text(&self) -> Option<&str> {
        match self {
            ElementKind::Text(t) => Some(&t.text),
            ElementKind::Sticky(s) => Some(&s.text),
            _ => None,
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            ElementKind::Text(t) => Some(&mut t.text),
            ElementKind::Sticky(s) => Some(&mut s.text),
            _ => None,
        }
    }
}

/// A single drawable entity on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub(crate) id: ElementId,
    /// Top-left corner in canvas space (origin of a stroke's points).
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Rotation in degrees around the box center.
    #[serde(default)]
    pub rotation: f64,
    pub(crate) z_index: u64,
    /// Serialized inline, so the `type` tag sits beside the common fields.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Paint and hit-test order. Never reused within a page.
    pub fn z_index(&self) -> u64 {
        self.z_index
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn text(&self) -> Option<&str> {
        self.kind.text()
    }

    /// Text and sticky elements can enter inline editing.
    pub fn is_text_editable(&self) -> bool {
        self.kind.text().is_some()
    }

    /// Size of the element's box, measuring text and strokes when no box is stored.
    pub fn size(&self) -> Size {
        match (&self.kind, self.width, self.height) {
            (_, Some(w), Some(h)) => Size::new(w, h),
            (ElementKind::Stroke(stroke), _, _) => stroke.local_bounds().size(),
            (ElementKind::Text(text), w, h) => {
                let measured = text.measure();
                Size::new(w.unwrap_or(measured.width), h.unwrap_or(measured.height))
            }
            (_, w, h) => Size::new(w.unwrap_or(0.0), h.unwrap_or(0.0)),
        }
    }

    /// Unrotated bounding box in canvas space.
    pub fn bounds(&self) -> Rect {
        if let ElementKind::Stroke(stroke) = &self.kind {
            return stroke.local_bounds() + self.position.to_vec2();
        }
        Rect::from_origin_size(self.position, self.size())
    }

    /// Center of rotation.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Check if a canvas-space point hits this element.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let bounds = self.bounds();
        let local = rotate_point(point, bounds.center(), -self.rotation);

        match &self.kind {
            ElementKind::Stroke(stroke) => {
                stroke.hit_test(local - self.position.to_vec2(), tolerance)
            }
            ElementKind::Shape(shape) if shape.shape.is_linear() => {
                let start = self.position;
                let end = Point::new(self.position.x + bounds.width(), self.position.y);
                point_to_segment_dist(local, start, end) <= tolerance + shape.stroke_width / 2.0
            }
            ElementKind::Shape(ShapeData {
                shape: ShapeKind::Circle,
                ..
            }) => {
                let rx = bounds.width() / 2.0 + tolerance;
                let ry = bounds.height() / 2.0 + tolerance;
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let d = local - bounds.center();
                (d.x / rx).powi(2) + (d.y / ry).powi(2) <= 1.0
            }
            _ => bounds.inflate(tolerance, tolerance).contains(local),
        }
    }

    /// Merge a partial update. Fields that don't apply to this variant are ignored.
    ///
    /// Returns true if anything changed.
    pub fn apply(&mut self, patch: &ElementPatch) -> bool {
        let before = self.clone();

        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(width) = patch.width {
            self.width = Some(width);
        }
        if let Some(height) = patch.height {
            self.height = Some(height);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(text) = &patch.text {
            if let Some(current) = self.kind.text_mut() {
                current.clone_from(text);
            }
        }

        match &mut self.kind {
            ElementKind::Stroke(stroke) => {
                if let Some(color) = patch.color {
                    stroke.color = color;
                }
                if let Some(width) = patch.stroke_width {
                    stroke.stroke_width = width;
                }
                if let Some(opacity) = patch.opacity {
                    stroke.opacity = opacity.clamp(0.0, 1.0);
                }
            }
            ElementKind::Shape(shape) => {
                if let Some(color) = patch.color {
                    shape.color = color;
                }
                if let Some(width) = patch.stroke_width {
                    shape.stroke_width = width;
                }
            }
            ElementKind::Text(text) => {
                if let Some(color) = patch.color {
                    text.color = color;
                }
                if let Some(size) = patch.font_size {
                    text.font_size = size;
                }
            }
            ElementKind::Sticky(sticky) => {
                if let Some(background) = patch.background {
                    sticky.background = background;
                }
            }
            ElementKind::Image(_) => {}
        }

        *self != before
    }
}

/// Everything needed to create an element except its id and z-index.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDraft {
    pub position: Point,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: f64,
    pub kind: ElementKind,
}

impl ElementDraft {
    pub fn new(position: Point, kind: ElementKind) -> Self {
        Self {
            position,
            width: None,
            height: None,
            rotation: 0.0,
            kind,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// A committed stroke; its points already carry canvas coordinates.
    pub fn stroke(stroke: StrokeData) -> Self {
        Self::new(Point::ZERO, ElementKind::Stroke(stroke))
    }

    pub fn shape(
        position: Point,
        shape: ShapeKind,
        color: SerializableColor,
        stroke_width: f64,
    ) -> Self {
        Self::new(
            position,
            ElementKind::Shape(ShapeData {
                shape,
                color,
                stroke_width,
            }),
        )
    }

    pub fn text(
        position: Point,
        text: impl Into<String>,
        font_size: f64,
        color: SerializableColor,
    ) -> Self {
        Self::new(
            position,
            ElementKind::Text(TextData {
                text: text.into(),
                font_size,
                color,
            }),
        )
    }

    pub fn sticky(position: Point, background: SerializableColor, text: impl Into<String>) -> Self {
        Self::new(
            position,
            ElementKind::Sticky(StickyData {
                background,
                text: text.into(),
            }),
        )
    }

    pub fn image(position: Point, image: ImageData, size: Size) -> Self {
        Self::new(position, ElementKind::Image(image)).with_size(size.width, size.height)
    }

    pub(crate) fn into_element(self, z_index: u64) -> Element {
        let (default_w, default_h) = self.kind.default_size();
        Element {
            id: Uuid::new_v4(),
            position: self.position,
            width: self.width.or(default_w),
            height: self.height.or(default_h),
            rotation: self.rotation,
            z_index,
            kind: self.kind,
        }
    }
}

/// Partial update for an existing element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub position: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub text: Option<String>,
    pub color: Option<SerializableColor>,
    pub stroke_width: Option<f64>,
    pub font_size: Option<f64>,
    /// Paper color, sticky notes only.
    pub background: Option<SerializableColor>,
    pub opacity: Option<f64>,
}

impl ElementPatch {
    pub fn moved_to(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_color(color: SerializableColor) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn green() -> SerializableColor {
        SerializableColor::rgb(0x10, 0xB9, 0x81)
    }

    #[test]
    fn test_sticky_default_size() {
        let el = ElementDraft::sticky(Point::new(50.0, 50.0), SerializableColor::white(), "hi")
            .into_element(0);
        assert_eq!(el.width, Some(200.0));
        assert_eq!(el.height, Some(150.0));
        assert_eq!(el.kind_name(), "sticky");
    }

    #[test]
    fn test_linear_shape_has_zero_height() {
        let el = ElementDraft::shape(Point::ZERO, ShapeKind::Arrow, green(), 3.0).into_element(0);
        assert_eq!(el.width, Some(100.0));
        assert_eq!(el.height, Some(0.0));
    }

    #[test]
    fn test_rectangle_hit_test() {
        let el = ElementDraft::shape(Point::new(10.0, 10.0), ShapeKind::Rectangle, green(), 3.0)
            .into_element(0);
        assert!(el.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(el.hit_test(Point::new(112.0, 50.0), 5.0));
        assert!(!el.hit_test(Point::new(120.0, 50.0), 5.0));
    }

    #[test]
    fn test_rotated_rectangle_hit_test() {
        let mut el = ElementDraft::shape(Point::ZERO, ShapeKind::Rectangle, green(), 1.0)
            .with_size(200.0, 20.0)
            .into_element(0);
        el.rotation = 90.0;
        // Now spans roughly x 90..110, y -90..110.
        assert!(el.hit_test(Point::new(100.0, -80.0), 0.0));
        assert!(!el.hit_test(Point::new(10.0, 10.0), 0.0));
    }

    #[test]
    fn test_circle_hit_test() {
        let el = ElementDraft::shape(Point::ZERO, ShapeKind::Circle, green(), 1.0).into_element(0);
        assert!(el.hit_test(Point::new(50.0, 50.0), 0.0));
        // Corner of the bounding box is outside the inscribed circle.
        assert!(!el.hit_test(Point::new(2.0, 2.0), 0.0));
    }

    #[test]
    fn test_line_hit_test() {
        let el = ElementDraft::shape(Point::new(0.0, 10.0), ShapeKind::Line, green(), 2.0)
            .into_element(0);
        assert!(el.hit_test(Point::new(50.0, 12.0), 2.0));
        assert!(!el.hit_test(Point::new(50.0, 30.0), 2.0));
    }

    #[test]
    fn test_stroke_hit_test_follows_position() {
        let mut el = ElementDraft::stroke(StrokeData {
            points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            color: green(),
            stroke_width: 4.0,
            opacity: 1.0,
        })
        .into_element(0);
        assert!(el.hit_test(Point::new(50.0, 1.0), 0.0));

        el.apply(&ElementPatch::moved_to(Point::new(0.0, 50.0)));
        assert!(!el.hit_test(Point::new(50.0, 1.0), 0.0));
        assert!(el.hit_test(Point::new(50.0, 51.0), 0.0));
    }

    #[test]
    fn test_patch_ignores_foreign_fields() {
        let mut el = ElementDraft::shape(Point::ZERO, ShapeKind::Rectangle, green(), 3.0)
            .into_element(4);
        let changed = el.apply(&ElementPatch::with_text("ignored"));
        assert!(!changed);
        assert_eq!(el.z_index(), 4);
    }

    #[test]
    fn test_patch_text_and_background() {
        let mut el = ElementDraft::sticky(Point::ZERO, SerializableColor::white(), "a")
            .into_element(0);
        let mut patch = ElementPatch::with_text("b");
        patch.background = Some(green());
        assert!(el.apply(&patch));
        assert_eq!(el.text(), Some("b"));
        match &el.kind {
            ElementKind::Sticky(sticky) => assert_eq!(sticky.background, green()),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_element_json_tag() {
        let el = ElementDraft::text(Point::new(1.0, 2.0), "hello", 16.0, green()).into_element(7);
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hello");
        assert!(json.get("kind").is_none());
        assert_eq!(json["zIndex"], 7);
        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn test_point_to_segment_dist() {
        let d = point_to_segment_dist(Point::new(5.0, 5.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-10);
        let d = point_to_segment_dist(Point::new(-3.0, 4.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-10);
    }
}
