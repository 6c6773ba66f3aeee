//! Sticky note payload.

use super::SerializableColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Fixed default box of a sticky note.
pub const STICKY_SIZE: Size = Size::new(200.0, 150.0);

/// Placeholder content of a new sticky note.
pub const DEFAULT_STICKY_TEXT: &str = "Click to edit...";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyData {
    /// Paper color of the note.
    pub background: SerializableColor,
    pub text: String,
}
