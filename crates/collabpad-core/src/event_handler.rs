//! Translates pointer and keyboard input into canvas operations.

use crate::canvas::{Canvas, ChangeKind};
use crate::elements::{
    DEFAULT_STICKY_TEXT, DEFAULT_TEXT, ElementDraft, ElementId, ElementPatch,
};
use crate::input::{InputState, Key, KeyEvent, MouseButton, PointerEvent};
use crate::selection::{ManipulationState, TransformPreview, hit_test_handles};
use crate::tools::ToolKind;
use kurbo::Point;

/// Gesture in progress between a press and its release.
#[derive(Debug, Clone)]
enum Gesture {
    /// Whole-element drag, applied live.
    Moving(ManipulationState),
    /// Resize or rotate, previewed until release.
    Transforming(ManipulationState),
    /// Camera drag. `last` is in screen space.
    Panning { last: Point },
    Drawing,
    Erasing,
}

/// Handles high-level events and translates them to canvas operations.
#[derive(Debug, Default)]
pub struct EventHandler {
    pub input: InputState,
    gesture: Option<Gesture>,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_manipulating(&self) -> bool {
        matches!(
            self.gesture,
            Some(Gesture::Moving(_)) | Some(Gesture::Transforming(_))
        )
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Panning { .. }))
    }

    pub fn manipulation(&self) -> Option<&ManipulationState> {
        match &self.gesture {
            Some(Gesture::Moving(m)) | Some(Gesture::Transforming(m)) => Some(m),
            _ => None,
        }
    }

    /// Resize/rotate preview for the renderer.
    pub fn transform_preview(&self, canvas: &Canvas) -> Option<TransformPreview> {
        match &self.gesture {
            Some(Gesture::Transforming(m)) => Some(m.preview(
                canvas.config.min_element_size,
                self.input.modifiers.shift,
            )),
            _ => None,
        }
    }

    /// Feed one pointer event. Positions are in screen space.
    pub fn handle_pointer(&mut self, canvas: &mut Canvas, event: &PointerEvent) {
        self.input.handle_pointer_event(event);
        match *event {
            PointerEvent::Down { position, button } => self.handle_press(canvas, position, button),
            PointerEvent::Move { position } => self.handle_drag(canvas, position),
            PointerEvent::Up { position, .. } => self.handle_release(canvas, position),
            PointerEvent::Leave => {
                let last = self.input.pointer_position;
                self.handle_release(canvas, last);
            }
            PointerEvent::Wheel { position, delta_y } => {
                canvas.wheel_zoom(position, delta_y);
            }
        }
    }

    fn handle_press(&mut self, canvas: &mut Canvas, screen: Point, button: MouseButton) {
        // A press anywhere closes an open text edit.
        if canvas.widgets.is_editing() {
            canvas.commit_text_edit();
        }

        let tool = canvas.tool_manager.current_tool();
        if button == MouseButton::Middle || (button == MouseButton::Left && tool == ToolKind::Pan) {
            self.gesture = Some(Gesture::Panning { last: screen });
            return;
        }
        if button != MouseButton::Left {
            return;
        }

        let world = canvas.camera.screen_to_world(screen);
        match tool {
            ToolKind::Select => self.press_select(canvas, world),
            ToolKind::Pen | ToolKind::Highlighter => {
                if canvas.tool_manager.begin_stroke(world) {
                    self.gesture = Some(Gesture::Drawing);
                }
            }
            ToolKind::Eraser => {
                self.gesture = Some(Gesture::Erasing);
                Self::apply_eraser(canvas, world);
            }
            ToolKind::Shape | ToolKind::Text | ToolKind::Sticky => {
                self.place_element(canvas, tool, world);
            }
            // Images arrive through `Canvas::insert_image`.
            ToolKind::Image | ToolKind::Pan => {}
        }
    }

    fn press_select(&mut self, canvas: &mut Canvas, world: Point) {
        let handle_tolerance = canvas.config.handle_tolerance / canvas.camera.zoom();
        if let Some(selected) = canvas.selection().and_then(|id| canvas.element(id)) {
            if let Some(handle) = hit_test_handles(selected, world, handle_tolerance) {
                let state = ManipulationState::new(selected, Some(handle), world);
                self.gesture = Some(Gesture::Transforming(state));
                return;
            }
        }

        let Some(id) = canvas.element_at(world) else {
            canvas.clear_selection();
            return;
        };

        if self.input.is_double_click() && canvas.begin_text_edit(id) {
            return;
        }

        canvas.select(id);
        if let Some(element) = canvas.element(id) {
            self.gesture = Some(Gesture::Moving(ManipulationState::new(element, None, world)));
        }
    }

    /// Create a shape, text or sticky at `world` unless something is already there.
    fn place_element(&mut self, canvas: &mut Canvas, tool: ToolKind, world: Point) {
        if canvas.element_at(world).is_some() {
            return;
        }
        let settings = &canvas.tool_manager.settings;
        let draft = match tool {
            ToolKind::Shape => {
                let (w, h) = settings.shape.default_size(canvas.config.shape_size);
                ElementDraft::shape(world, settings.shape, settings.color, settings.stroke_width)
                    .with_size(w, h)
            }
            ToolKind::Text => {
                ElementDraft::text(world, DEFAULT_TEXT, settings.font_size, settings.color)
            }
            ToolKind::Sticky => {
                let size = canvas.config.sticky_size;
                ElementDraft::sticky(world, settings.sticky_color, DEFAULT_STICKY_TEXT)
                    .with_size(size.width, size.height)
            }
            _ => return,
        };
        let id = canvas.create_element(draft);
        log::debug!("placed {tool:?} element {id}");
    }

    fn handle_drag(&mut self, canvas: &mut Canvas, screen: Point) {
        let world = canvas.camera.screen_to_world(screen);
        canvas.update_cursor(world);

        let Some(gesture) = &mut self.gesture else {
            if canvas.tool_manager.current_tool() == ToolKind::Select {
                let hovered = canvas.element_at(world);
                canvas.widgets.set_hovered(hovered);
            }
            return;
        };

        match gesture {
            Gesture::Moving(state) => {
                state.update(world);
                let patch = ElementPatch::moved_to(state.moved_position());
                let id = state.element_id;
                canvas.page_mut().update_element(id, &patch);
            }
            Gesture::Transforming(state) => state.update(world),
            Gesture::Panning { last } => {
                canvas.camera.pan(screen - *last);
                *last = screen;
            }
            Gesture::Drawing => {
                canvas.tool_manager.extend_stroke(world);
            }
            Gesture::Erasing => Self::apply_eraser(canvas, world),
        }
    }

    fn handle_release(&mut self, canvas: &mut Canvas, screen: Point) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let world = canvas.camera.screen_to_world(screen);

        match gesture {
            Gesture::Moving(state) => {
                if state.has_moved() && canvas.element(state.element_id).is_some() {
                    canvas.snapshot();
                }
            }
            Gesture::Transforming(mut state) => {
                state.update(world);
                if state.has_moved() {
                    let patch =
                        state.bake(canvas.config.min_element_size, self.input.modifiers.shift);
                    if canvas.page_mut().update_element(state.element_id, &patch) {
                        canvas.snapshot();
                    }
                }
            }
            Gesture::Panning { .. } => canvas.notify(ChangeKind::View),
            Gesture::Drawing => {
                if let Some(stroke) = canvas.tool_manager.finish_stroke() {
                    canvas.create_element(ElementDraft::stroke(stroke));
                }
            }
            Gesture::Erasing => {}
        }
    }

    /// Delete everything within the eraser radius. Each deletion is its own
    /// history entry.
    fn apply_eraser(canvas: &mut Canvas, world: Point) {
        let radius = canvas.config.eraser_radius / canvas.camera.zoom();
        let hits: Vec<ElementId> = canvas.current_page().elements_at(world, radius);
        for id in hits {
            canvas.delete_element(id);
        }
    }

    /// Handle a key press. Returns true if the key was consumed.
    pub fn handle_key(&mut self, canvas: &mut Canvas, event: &KeyEvent) -> bool {
        self.input.set_modifiers(event.modifiers);

        if canvas.widgets.is_editing() {
            // Enter and Escape both keep the typed text; Shift+Enter is a newline.
            let commits = match event.key {
                Key::Enter => !event.modifiers.shift,
                Key::Escape => true,
                _ => false,
            };
            if commits {
                canvas.commit_text_edit();
            }
            return commits;
        }

        match &event.key {
            Key::Escape => self.cancel(canvas),
            Key::Delete | Key::Backspace => canvas.delete_selected(),
            _ if event.modifiers.command() && event.is_char('z') => {
                if event.modifiers.shift {
                    canvas.redo()
                } else {
                    canvas.undo()
                }
            }
            _ => false,
        }
    }

    /// Abandon the gesture in progress. A dragged element returns to where
    /// it started and an unfinished stroke is dropped.
    pub fn cancel(&mut self, canvas: &mut Canvas) -> bool {
        if canvas.cancel_text_edit() {
            return true;
        }
        match self.gesture.take() {
            Some(Gesture::Moving(state)) | Some(Gesture::Transforming(state)) => {
                let original = &state.original;
                let restore = ElementPatch {
                    position: Some(original.position),
                    width: original.width,
                    height: original.height,
                    rotation: Some(original.rotation),
                    ..ElementPatch::default()
                };
                canvas.page_mut().update_element(state.element_id, &restore);
                canvas.notify(ChangeKind::Elements);
                true
            }
            Some(Gesture::Drawing) => {
                canvas.tool_manager.cancel();
                canvas.notify(ChangeKind::Tool);
                true
            }
            Some(Gesture::Panning { .. }) => {
                canvas.notify(ChangeKind::View);
                true
            }
            Some(Gesture::Erasing) => true,
            None => {
                let had_selection = canvas.selection().is_some();
                canvas.clear_selection();
                had_selection
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Element, ElementKind, SerializableColor, ShapeKind};
    use crate::input::Modifiers;
    use kurbo::Vec2;

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn drag(handler: &mut EventHandler, canvas: &mut Canvas, points: &[(f64, f64)]) {
        let (first, rest) = points.split_first().unwrap();
        handler.handle_pointer(canvas, &down(first.0, first.1));
        for p in rest {
            handler.handle_pointer(canvas, &moved(p.0, p.1));
        }
        let last = points.last().unwrap();
        handler.handle_pointer(canvas, &up(last.0, last.1));
    }

    fn ctrl() -> Modifiers {
        Modifiers {
            ctrl: true,
            ..Modifiers::default()
        }
    }

    fn rect_at(canvas: &mut Canvas, x: f64, y: f64) -> ElementId {
        canvas.create_element(ElementDraft::shape(
            Point::new(x, y),
            ShapeKind::Rectangle,
            SerializableColor::black(),
            2.0,
        ))
    }

    #[test]
    fn test_pen_stroke_commits_on_release() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        canvas.set_tool(ToolKind::Pen);

        drag(&mut handler, &mut canvas, &[(10.0, 10.0), (20.0, 20.0), (30.0, 10.0)]);

        let elements = canvas.elements();
        assert_eq!(elements.len(), 1);
        match &elements[0].kind {
            ElementKind::Stroke(stroke) => assert_eq!(stroke.points.len(), 3),
            other => panic!("expected stroke, got {other:?}"),
        }
        assert!(canvas.can_undo());
        assert!(!canvas.tool_manager.is_drawing());
    }

    #[test]
    fn test_single_point_stroke_is_dropped() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        canvas.set_tool(ToolKind::Pen);
        drag(&mut handler, &mut canvas, &[(10.0, 10.0)]);
        assert!(canvas.current_page().is_empty());
        assert!(!canvas.can_undo());
    }

    #[test]
    fn test_highlighter_width_and_opacity() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        canvas.set_tool(ToolKind::Highlighter);
        drag(&mut handler, &mut canvas, &[(0.0, 0.0), (50.0, 0.0)]);
        match &canvas.elements()[0].kind {
            ElementKind::Stroke(stroke) => {
                assert!((stroke.stroke_width - 6.0).abs() < 1e-9);
                assert!((stroke.opacity - 0.4).abs() < 1e-9);
            }
            other => panic!("expected stroke, got {other:?}"),
        }
    }

    #[test]
    fn test_leave_commits_stroke() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        canvas.set_tool(ToolKind::Pen);
        handler.handle_pointer(&mut canvas, &down(0.0, 0.0));
        handler.handle_pointer(&mut canvas, &moved(5.0, 5.0));
        handler.handle_pointer(&mut canvas, &PointerEvent::Leave);
        assert_eq!(canvas.current_page().len(), 1);
    }

    #[test]
    fn test_stroke_points_in_canvas_space() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        canvas.set_zoom(2.0);
        canvas.set_pan(Vec2::new(100.0, 0.0));
        canvas.set_tool(ToolKind::Pen);
        drag(&mut handler, &mut canvas, &[(100.0, 0.0), (120.0, 40.0)]);
        match &canvas.elements()[0].kind {
            ElementKind::Stroke(stroke) => {
                assert_eq!(stroke.points, vec![Point::ZERO, Point::new(10.0, 20.0)]);
            }
            other => panic!("expected stroke, got {other:?}"),
        }
    }

    #[test]
    fn test_sticky_placed_only_on_empty_canvas() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        canvas.set_tool(ToolKind::Sticky);

        drag(&mut handler, &mut canvas, &[(50.0, 50.0)]);
        let el = canvas.elements()[0].clone();
        assert_eq!(el.kind_name(), "sticky");
        assert_eq!(el.width, Some(200.0));
        assert_eq!(el.height, Some(150.0));
        assert_eq!(el.text(), Some(DEFAULT_STICKY_TEXT));

        // Inside the existing note: nothing new.
        drag(&mut handler, &mut canvas, &[(60.0, 60.0)]);
        assert_eq!(canvas.current_page().len(), 1);
    }

    #[test]
    fn test_pan_tool_moves_camera_not_elements() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        let id = rect_at(&mut canvas, 0.0, 0.0);
        canvas.set_tool(ToolKind::Pan);

        drag(&mut handler, &mut canvas, &[(10.0, 10.0), (40.0, 30.0)]);
        assert_eq!(canvas.camera.offset, Vec2::new(30.0, 20.0));
        assert_eq!(canvas.element(id).map(|e| e.position), Some(Point::ZERO));
        assert_eq!(canvas.current_page().len(), 1);
    }

    #[test]
    fn test_middle_button_pans_in_any_tool() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        canvas.set_tool(ToolKind::Pen);
        handler.handle_pointer(
            &mut canvas,
            &PointerEvent::Down {
                position: Point::ZERO,
                button: MouseButton::Middle,
            },
        );
        handler.handle_pointer(&mut canvas, &moved(5.0, 5.0));
        assert!(handler.is_panning());
        assert_eq!(canvas.camera.offset, Vec2::new(5.0, 5.0));
        assert!(!canvas.tool_manager.is_drawing());
    }

    #[test]
    fn test_select_drag_moves_and_snapshots_once() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        let id = rect_at(&mut canvas, 0.0, 0.0);
        let len = canvas.history_len();

        drag(
            &mut handler,
            &mut canvas,
            &[(50.0, 50.0), (60.0, 55.0), (70.0, 60.0), (80.0, 70.0)],
        );
        assert_eq!(canvas.selection(), Some(id));
        assert_eq!(canvas.element(id).map(|e| e.position), Some(Point::new(30.0, 20.0)));
        assert_eq!(canvas.history_len(), len + 1);

        canvas.undo();
        assert_eq!(canvas.element(id).map(|e| e.position), Some(Point::ZERO));
    }

    #[test]
    fn test_click_without_move_does_not_snapshot() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        rect_at(&mut canvas, 0.0, 0.0);
        let len = canvas.history_len();
        drag(&mut handler, &mut canvas, &[(50.0, 50.0)]);
        assert_eq!(canvas.history_len(), len);
    }

    #[test]
    fn test_click_empty_clears_selection() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        let id = rect_at(&mut canvas, 0.0, 0.0);
        canvas.select(id);
        drag(&mut handler, &mut canvas, &[(500.0, 500.0)]);
        assert_eq!(canvas.selection(), None);
    }

    #[test]
    fn test_resize_handle_bakes_geometry() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        let id = rect_at(&mut canvas, 0.0, 0.0);
        canvas.select(id);

        drag(&mut handler, &mut canvas, &[(100.0, 100.0), (150.0, 130.0)]);
        let el: &Element = canvas.element(id).unwrap();
        assert_eq!(el.width, Some(150.0));
        assert_eq!(el.height, Some(130.0));
        assert_eq!(el.position, Point::ZERO);
    }

    #[test]
    fn test_resize_clamps_to_min_size() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        let id = rect_at(&mut canvas, 0.0, 0.0);
        canvas.select(id);
        drag(&mut handler, &mut canvas, &[(100.0, 100.0), (-300.0, -300.0)]);
        let el = canvas.element(id).unwrap();
        assert_eq!(el.width, Some(20.0));
        assert_eq!(el.height, Some(20.0));
    }

    #[test]
    fn test_escape_restores_dragged_element() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        let id = rect_at(&mut canvas, 0.0, 0.0);
        let len = canvas.history_len();

        handler.handle_pointer(&mut canvas, &down(50.0, 50.0));
        handler.handle_pointer(&mut canvas, &moved(90.0, 90.0));
        assert!(handler.is_manipulating());
        assert!(handler.handle_key(&mut canvas, &KeyEvent::new(Key::Escape)));
        handler.handle_pointer(&mut canvas, &up(90.0, 90.0));

        assert_eq!(canvas.element(id).map(|e| e.position), Some(Point::ZERO));
        assert_eq!(canvas.history_len(), len);
    }

    #[test]
    fn test_eraser_deletes_hits() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        rect_at(&mut canvas, 0.0, 0.0);
        rect_at(&mut canvas, 300.0, 0.0);
        let len = canvas.history_len();
        canvas.set_tool(ToolKind::Eraser);

        drag(&mut handler, &mut canvas, &[(50.0, 50.0), (350.0, 50.0)]);
        assert!(canvas.current_page().is_empty());
        assert_eq!(canvas.history_len(), len + 2);
    }

    #[test]
    fn test_double_click_edits_text() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        let id = canvas.create_element(ElementDraft::text(
            Point::ZERO,
            "hello",
            16.0,
            SerializableColor::black(),
        ));

        drag(&mut handler, &mut canvas, &[(5.0, 5.0)]);
        drag(&mut handler, &mut canvas, &[(5.0, 5.0)]);
        assert!(canvas.widgets.is_editing());

        canvas.set_text_draft("bye");
        // Shortcuts are suspended while typing.
        assert!(!handler.handle_key(&mut canvas, &KeyEvent::new(Key::Delete)));
        assert!(handler.handle_key(&mut canvas, &KeyEvent::new(Key::Enter)));
        assert!(!canvas.widgets.is_editing());
        assert_eq!(canvas.element(id).and_then(Element::text), Some("bye"));
    }

    #[test]
    fn test_shift_enter_does_not_commit() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        let id = canvas.create_element(ElementDraft::text(
            Point::ZERO,
            "a",
            16.0,
            SerializableColor::black(),
        ));
        canvas.begin_text_edit(id);
        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        assert!(!handler.handle_key(&mut canvas, &KeyEvent::with_modifiers(Key::Enter, shift)));
        assert!(canvas.widgets.is_editing());
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        let id = rect_at(&mut canvas, 0.0, 0.0);
        canvas.select(id);

        assert!(handler.handle_key(&mut canvas, &KeyEvent::new(Key::Backspace)));
        assert!(canvas.current_page().is_empty());

        let undo = KeyEvent::with_modifiers(Key::Character("z".into()), ctrl());
        assert!(handler.handle_key(&mut canvas, &undo));
        assert!(canvas.element(id).is_some());

        let redo = KeyEvent::with_modifiers(
            Key::Character("Z".into()),
            Modifiers {
                shift: true,
                ..ctrl()
            },
        );
        assert!(handler.handle_key(&mut canvas, &redo));
        assert!(canvas.element(id).is_none());
    }

    #[test]
    fn test_wheel_zoom_anchors_pointer() {
        let mut canvas = Canvas::new();
        let mut handler = EventHandler::new();
        let cursor = Point::new(200.0, 150.0);
        let before = canvas.camera.screen_to_world(cursor);
        handler.handle_pointer(
            &mut canvas,
            &PointerEvent::Wheel {
                position: cursor,
                delta_y: -1.0,
            },
        );
        let after = canvas.camera.screen_to_world(cursor);
        assert!(canvas.camera.zoom() > 1.0);
        assert!((before - after).hypot() < 1e-9);
    }
}
