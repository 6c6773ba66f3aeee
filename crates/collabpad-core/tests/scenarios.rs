//! End-to-end flows through the public API.

use collabpad_core::elements::{DEFAULT_STICKY_TEXT, SerializableColor, ShapeKind};
use collabpad_core::storage::FileStorage;
use collabpad_core::{
    Canvas, CanvasConfig, ElementDraft, ElementKind, EventHandler, MouseButton, PointerEvent,
    ToolKind,
};
use kurbo::Point;

fn press(handler: &mut EventHandler, canvas: &mut Canvas, x: f64, y: f64) {
    handler.handle_pointer(
        canvas,
        &PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        },
    );
}

fn release(handler: &mut EventHandler, canvas: &mut Canvas, x: f64, y: f64) {
    handler.handle_pointer(
        canvas,
        &PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        },
    );
}

#[test]
fn test_draw_undo_redo_in_new_notebook() {
    let mut canvas = Canvas::new();
    let mut handler = EventHandler::new();

    canvas.create_notebook("N1");
    assert_eq!(canvas.document().current_notebook().name, "N1");
    assert_eq!(canvas.current_page().name, "Page 1");

    canvas.set_tool(ToolKind::Pen);
    press(&mut handler, &mut canvas, 0.0, 0.0);
    handler.handle_pointer(&mut canvas, &PointerEvent::Move { position: Point::new(10.0, 5.0) });
    handler.handle_pointer(&mut canvas, &PointerEvent::Move { position: Point::new(20.0, 0.0) });
    release(&mut handler, &mut canvas, 20.0, 0.0);

    let stroke = canvas.elements()[0].clone();
    assert!(canvas.can_undo());
    assert!(!canvas.can_redo());

    assert!(canvas.undo());
    assert!(canvas.current_page().is_empty());
    assert!(canvas.can_redo());

    assert!(canvas.redo());
    let restored = canvas.element(stroke.id()).expect("stroke restored");
    assert_eq!(*restored, stroke);
    match &restored.kind {
        ElementKind::Stroke(data) => assert_eq!(data.points.len(), 3),
        other => panic!("expected stroke, got {other:?}"),
    }
}

#[test]
fn test_sticky_defaults() {
    let mut canvas = Canvas::new();
    let mut handler = EventHandler::new();
    canvas.set_tool(ToolKind::Sticky);
    press(&mut handler, &mut canvas, 50.0, 50.0);
    release(&mut handler, &mut canvas, 50.0, 50.0);

    let sticky = canvas.elements()[0];
    assert_eq!(sticky.position, Point::new(50.0, 50.0));
    assert_eq!((sticky.width, sticky.height), (Some(200.0), Some(150.0)));
    assert_eq!(sticky.kind_name(), "sticky");
    assert!(!sticky.id().is_nil());
    assert_eq!(sticky.text(), Some(DEFAULT_STICKY_TEXT));

    let json = serde_json::to_value(sticky).unwrap();
    assert_eq!(json["type"], "sticky");
    assert_eq!(json["width"], 200.0);
}

#[test]
fn test_z_index_strictly_increasing() {
    let mut canvas = Canvas::new();
    let mut last = None;
    for i in 0..10 {
        let id = canvas.create_element(ElementDraft::shape(
            Point::new(i as f64 * 200.0, 0.0),
            ShapeKind::Circle,
            SerializableColor::black(),
            1.0,
        ));
        let z = canvas.element(id).unwrap().z_index();
        if let Some(prev) = last {
            assert!(z > prev);
        }
        last = Some(z);
        if i % 3 == 0 {
            canvas.delete_element(id);
        }
    }
}

#[test]
fn test_poll_vote_toggle() {
    let mut canvas = Canvas::new();
    let poll = canvas.add_poll("Ready?", &["Yes", "No"]).unwrap();
    let (yes, no) = {
        let p = canvas.current_page().poll(poll).unwrap();
        (p.options[0].id, p.options[1].id)
    };
    let me = canvas.preferences().user_id;

    canvas.vote_poll(poll, yes);
    let p = canvas.current_page().poll(poll).unwrap();
    assert!(p.options[0].votes.contains(&me));
    assert!(!p.options[1].votes.contains(&me));

    canvas.vote_poll(poll, no);
    let p = canvas.current_page().poll(poll).unwrap();
    assert!(!p.options[0].votes.contains(&me));
    assert!(p.options[1].votes.contains(&me));

    canvas.vote_poll(poll, no);
    assert_eq!(canvas.current_page().poll(poll).unwrap().total_votes(), 0);
}

#[test]
fn test_deleting_everything_leaves_one_page() {
    let mut canvas = Canvas::new();
    let only = canvas.document().current_notebook_id();
    canvas.delete_notebook(only);

    let doc = canvas.document();
    assert_eq!(doc.notebooks().len(), 1);
    assert_eq!(doc.notebooks()[0].pages().len(), 1);
    assert_eq!(doc.current_notebook_id(), doc.notebooks()[0].id);
    assert_eq!(doc.current_page_id(), doc.notebooks()[0].pages()[0].id);
}

#[test]
fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = CanvasConfig::default();

    let mut canvas = Canvas::open(
        config.clone(),
        Box::new(FileStorage::new(dir.path().to_path_buf()).unwrap()),
    );
    let notebook = canvas.create_notebook("Lab");
    canvas.create_page(notebook, "Results");
    canvas.create_element(ElementDraft::text(
        Point::new(5.0, 5.0),
        "t = 4.2s",
        16.0,
        SerializableColor::black(),
    ));

    let store = FileStorage::new(dir.path().to_path_buf()).unwrap();
    let reopened = Canvas::open(config, Box::new(store));
    assert_eq!(reopened.document().current_notebook().name, "Lab");
    assert_eq!(reopened.current_page().name, "Results");
    assert_eq!(reopened.elements()[0].text(), Some("t = 4.2s"));
}
