//! Widget manager for tracking UI state of elements.

use super::state::WidgetState;
use crate::elements::ElementId;

/// Inline text edit in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub element_id: ElementId,
    /// Text when editing began.
    pub original: String,
    /// Text as currently typed.
    pub draft: String,
}

impl TextEdit {
    pub fn is_changed(&self) -> bool {
        self.draft != self.original
    }
}

/// Tracks hover, the single selection and the active text edit.
#[derive(Debug, Clone, Default)]
pub struct WidgetManager {
    selected: Option<ElementId>,
    hovered: Option<ElementId>,
    editing: Option<TextEdit>,
}

impl WidgetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the state of an element.
    pub fn state(&self, id: ElementId) -> WidgetState {
        if self.editing.as_ref().is_some_and(|e| e.element_id == id) {
            WidgetState::Editing
        } else if self.selected == Some(id) {
            WidgetState::Selected
        } else if self.hovered == Some(id) {
            WidgetState::Hovered
        } else {
            WidgetState::Normal
        }
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected == Some(id)
    }

    /// Select a single element, replacing the previous selection.
    pub fn select(&mut self, id: ElementId) {
        if self.editing.as_ref().is_some_and(|e| e.element_id != id) {
            self.editing = None;
        }
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.editing = None;
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    pub fn set_hovered(&mut self, id: Option<ElementId>) {
        self.hovered = id;
    }

    /// Start editing `id`, which becomes the selection.
    pub fn enter_editing(&mut self, id: ElementId, text: &str) {
        self.selected = Some(id);
        self.editing = Some(TextEdit {
            element_id: id,
            original: text.to_string(),
            draft: text.to_string(),
        });
    }

    /// Replace the typed text. Ignored when nothing is being edited.
    pub fn set_draft(&mut self, text: &str) -> bool {
        match &mut self.editing {
            Some(edit) => {
                edit.draft = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Leave editing mode, handing back the edit. The element stays selected.
    pub fn exit_editing(&mut self) -> Option<TextEdit> {
        self.editing.take()
    }

    pub fn editing(&self) -> Option<&TextEdit> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Forget an element that was deleted.
    pub fn remove(&mut self, id: ElementId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.editing.as_ref().is_some_and(|e| e.element_id == id) {
            self.editing = None;
        }
    }

    /// Drop everything, e.g. on page switch.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_select_replaces() {
        let mut widgets = WidgetManager::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        widgets.select(a);
        widgets.select(b);
        assert_eq!(widgets.state(a), WidgetState::Normal);
        assert_eq!(widgets.state(b), WidgetState::Selected);
    }

    #[test]
    fn test_editing_hides_and_restores() {
        let mut widgets = WidgetManager::new();
        let id = Uuid::new_v4();
        widgets.enter_editing(id, "hello");
        assert!(!widgets.state(id).is_visible());

        widgets.set_draft("hello!");
        let edit = widgets.exit_editing().unwrap();
        assert!(edit.is_changed());
        assert_eq!(widgets.state(id), WidgetState::Selected);
        assert!(widgets.state(id).is_visible());
    }

    #[test]
    fn test_remove_clears_everything() {
        let mut widgets = WidgetManager::new();
        let id = Uuid::new_v4();
        widgets.set_hovered(Some(id));
        widgets.enter_editing(id, "x");
        widgets.remove(id);
        assert_eq!(widgets.state(id), WidgetState::Normal);
        assert!(!widgets.is_editing());
        assert!(widgets.selected().is_none());
    }
}
