//! Text label payload.

use super::SerializableColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Placeholder content of a text element created by a click.
pub const DEFAULT_TEXT: &str = "Double click to edit";

/// Average glyph advance relative to the font size.
const GLYPH_WIDTH_FACTOR: f64 = 0.6;
/// Line height relative to the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextData {
    pub text: String,
    pub font_size: f64,
    pub color: SerializableColor,
}

impl TextData {
    /// Approximate laid-out size, used when the element carries no explicit box.
    pub fn measure(&self) -> Size {
        measure_text(&self.text, self.font_size)
    }
}

/// Estimate the box a block of text occupies at `font_size`.
pub fn measure_text(text: &str, font_size: f64) -> Size {
    let lines = text.lines().count().max(1);
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0).max(1);
    Size::new(
        GLYPH_WIDTH_FACTOR * font_size * longest as f64,
        LINE_HEIGHT_FACTOR * font_size * lines as f64,
    )
}
