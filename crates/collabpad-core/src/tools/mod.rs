//! Tool system for the whiteboard.

use crate::elements::{SerializableColor, ShapeKind, StrokeData};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default drawing color (emerald).
pub const DEFAULT_COLOR: SerializableColor = SerializableColor::rgb(0x10, 0xB9, 0x81);
/// Default sticky note paper (pale yellow).
pub const DEFAULT_STICKY_COLOR: SerializableColor = SerializableColor::rgb(0xFE, 0xF3, 0xC7);

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Pen,
    Highlighter,
    Eraser,
    Shape,
    Text,
    Sticky,
    Image,
}

impl ToolKind {
    /// Tools that capture free-hand strokes.
    pub fn draws_strokes(self) -> bool {
        matches!(self, ToolKind::Pen | ToolKind::Highlighter)
    }

    /// Tools that place an element on a click into empty canvas.
    pub fn places_elements(self) -> bool {
        matches!(self, ToolKind::Shape | ToolKind::Text | ToolKind::Sticky)
    }
}

/// Style applied to newly created elements. Process-local, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSettings {
    pub color: SerializableColor,
    pub stroke_width: f64,
    pub font_size: f64,
    pub shape: ShapeKind,
    pub sticky_color: SerializableColor,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            stroke_width: 3.0,
            font_size: 16.0,
            shape: ShapeKind::Rectangle,
            sticky_color: DEFAULT_STICKY_COLOR,
        }
    }
}

/// Stroke being captured, not yet an element.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDraft {
    pub points: Vec<Point>,
    pub color: SerializableColor,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl StrokeDraft {
    fn into_stroke(self) -> StrokeData {
        StrokeData {
            points: self.points,
            color: self.color,
            stroke_width: self.stroke_width,
            opacity: self.opacity,
        }
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    #[default]
    Idle,
    /// Pointer is down with a drawing tool.
    Drawing(StrokeDraft),
}

/// Manages the current tool, its settings and the in-progress stroke.
#[derive(Debug, Clone)]
pub struct ToolManager {
    current_tool: ToolKind,
    pub state: ToolState,
    pub settings: ToolSettings,
    highlighter_width_multiplier: f64,
    highlighter_opacity: f64,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new(2.0, 0.4)
    }
}

impl ToolManager {
    pub fn new(highlighter_width_multiplier: f64, highlighter_opacity: f64) -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::Idle,
            settings: ToolSettings::default(),
            highlighter_width_multiplier,
            highlighter_opacity,
        }
    }

    pub fn current_tool(&self) -> ToolKind {
        self.current_tool
    }

    /// Switch tools. Any stroke in progress is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, ToolState::Drawing(_))
    }

    /// Start a stroke at a canvas point. Ignored for non-drawing tools.
    pub fn begin_stroke(&mut self, point: Point) -> bool {
        if !self.current_tool.draws_strokes() {
            return false;
        }
        let highlighter = self.current_tool == ToolKind::Highlighter;
        let (stroke_width, opacity) = if highlighter {
            (
                self.settings.stroke_width * self.highlighter_width_multiplier,
                self.highlighter_opacity,
            )
        } else {
            (self.settings.stroke_width, 1.0)
        };
        self.state = ToolState::Drawing(StrokeDraft {
            points: vec![point],
            color: self.settings.color,
            stroke_width,
            opacity,
        });
        true
    }

    /// Append a sample to the stroke in progress.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        match &mut self.state {
            ToolState::Drawing(draft) => {
                draft.points.push(point);
                true
            }
            ToolState::Idle => false,
        }
    }

    /// End the stroke. Strokes with a single sample produce nothing.
    pub fn finish_stroke(&mut self) -> Option<StrokeData> {
        match std::mem::take(&mut self.state) {
            ToolState::Drawing(draft) if draft.points.len() > 1 => Some(draft.into_stroke()),
            _ => None,
        }
    }

    /// Drop the stroke in progress.
    pub fn cancel(&mut self) -> bool {
        std::mem::take(&mut self.state) != ToolState::Idle
    }

    /// Stroke in progress, for the renderer.
    pub fn preview(&self) -> Option<&StrokeDraft> {
        match &self.state {
            ToolState::Drawing(draft) => Some(draft),
            ToolState::Idle => None,
        }
    }
}
