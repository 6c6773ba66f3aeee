//! Widget state definitions.

/// The UI state of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WidgetState {
    /// Normal display state - no interaction.
    #[default]
    Normal,
    /// Pointer is over the element.
    Hovered,
    /// Selected: shows handles, can be moved and transformed.
    Selected,
    /// Replaced on screen by an inline text editor.
    Editing,
}

impl WidgetState {
    /// Selected or editing.
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected | Self::Editing)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing)
    }

    /// The renderer draws the element itself unless an editor covers it.
    pub fn is_visible(&self) -> bool {
        !self.is_editing()
    }
}
