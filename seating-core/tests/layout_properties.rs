//! Layout Engine Property Tests
//!
//! Tests the geometric guarantees of the editor end to end:
//! - Screen/model conversion is an exact inverse under any zoom and pan
//! - Drag deltas scale by 1/zoom regardless of element size
//! - Joins produce flat provenance and replace their sources
//! - Selection never holds chairs or removed elements
//! - Rotation cycles through eight steps
//! - A zero-size canvas blocks gestures without errors

use proptest::prelude::*;
use seating_core::{
    Action, CanvasRect, Editor, Element, ElementType, GestureState, Point, PointerTarget,
    ViewTransform,
};

const EPSILON: f64 = 1e-6;

/// An editor with an 800x600 canvas at the page origin.
fn editor() -> Editor {
    let mut editor = Editor::default();
    editor.set_canvas_rect(CanvasRect::new(0.0, 0.0, 800.0, 600.0));
    editor
}

fn table(x: f64, y: f64, width: f64) -> Element {
    let mut table = Element::new(ElementType::Table).at(x, y);
    table.transform.width = width;
    table
}

proptest! {
    #[test]
    fn prop_screen_model_round_trip(
        zoom in 0.5f64..=2.0,
        pan_x in -5_000.0f64..5_000.0,
        pan_y in -5_000.0f64..5_000.0,
        sx in -2_000.0f64..2_000.0,
        sy in -2_000.0f64..2_000.0,
    ) {
        let view = ViewTransform { zoom, pan_x, pan_y };
        let back = view.model_to_screen(view.screen_to_model(Point::new(sx, sy)));
        prop_assert!((back.x - sx).abs() < EPSILON, "x: {} vs {}", back.x, sx);
        prop_assert!((back.y - sy).abs() < EPSILON, "y: {} vs {}", back.y, sy);
    }

    #[test]
    fn prop_drag_moves_by_delta_over_zoom(
        steps in 0u32..150,
        pan_x in -300.0f64..300.0,
        pan_y in -300.0f64..300.0,
        width in 1.0f64..400.0,
        height in 1.0f64..400.0,
        dx in -200.0f64..200.0,
        dy in -200.0f64..200.0,
    ) {
        let mut editor = editor();
        for _ in 0..steps {
            editor.wheel(&seating_core::WheelEvent { x: 0.0, y: 0.0, delta_y: 1.0 });
        }
        editor.viewport_mut().apply_pan(pan_x, pan_y);
        let zoom = editor.transform().zoom;

        let mut element = Element::new(ElementType::Other).at(10.0, 20.0);
        element.transform.width = width;
        element.transform.height = height;
        let id = editor.insert_element(element).expect("insert");

        let grab = editor.viewport().model_to_screen(Point::new(10.0, 20.0)) + Point::new(0.5, 0.5);
        editor.pointer_down(grab, Some(PointerTarget::Element(id)));
        editor.pointer_move(grab + Point::new(dx, dy));
        editor.pointer_up(grab + Point::new(dx, dy));

        let t = editor.scene().get(&id).expect("element").transform;
        prop_assert!((t.x - (10.0 + dx / zoom)).abs() < EPSILON);
        prop_assert!((t.y - (20.0 + dy / zoom)).abs() < EPSILON);
        prop_assert_eq!((t.width, t.height), (width, height));
    }
}

#[test]
fn join_two_adjacent_tables() {
    let mut editor = editor();
    let a = editor.insert_element(table(0.0, 0.0, 60.0)).expect("a");
    let b = editor.insert_element(table(60.0, 0.0, 60.0)).expect("b");
    editor.toggle_selection(&a).expect("select a");
    editor.toggle_selection(&b).expect("select b");

    let outcome = editor.join_tables().expect("join").expect("joined");
    let merged = editor.scene().get(&outcome.table).expect("merged");
    assert_eq!(merged.transform.x, 0.0);
    assert_eq!(merged.transform.y, 0.0);
    assert_eq!(merged.transform.width, 120.0);
    assert_eq!(merged.joined_from(), &[a, b]);
    assert!(editor.scene().get(&a).is_none());
    assert!(editor.scene().get(&b).is_none());
    assert_eq!(editor.scene().selection().ids(), &[outcome.table]);
}

#[test]
fn rejoin_yields_three_flat_ids() {
    let mut editor = editor();
    let a = editor.insert_element(table(0.0, 0.0, 60.0)).expect("a");
    let b = editor.insert_element(table(60.0, 0.0, 60.0)).expect("b");
    let c = editor.insert_element(table(120.0, 0.0, 60.0)).expect("c");
    editor.toggle_selection(&a).expect("select");
    editor.toggle_selection(&b).expect("select");
    editor.join_tables().expect("join").expect("first");

    editor.toggle_selection(&c).expect("select");
    let second = editor.join_tables().expect("join").expect("second");
    let merged = editor.scene().get(&second.table).expect("merged");
    assert_eq!(merged.joined_from().len(), 3);
    assert_eq!(merged.joined_from(), &[a, b, c]);
}

#[test]
fn chairs_never_enter_the_selection() {
    let mut editor = editor();
    let chair = editor.add_element(ElementType::Chair).expect("chair");
    assert!(!editor.toggle_selection(&chair).expect("toggle"));
    assert!(editor.scene().selection().is_empty());

    // clicking it does not select it either
    let centre = Point::new(400.0, 300.0);
    editor.pointer_down(centre, None);
    editor.pointer_up(centre);
    assert!(editor.scene().selection().is_empty());
}

#[test]
fn rotating_merged_table_cycles_eight_states() {
    let mut editor = editor();
    let a = editor.insert_element(table(0.0, 0.0, 60.0)).expect("a");
    let b = editor.insert_element(table(60.0, 0.0, 60.0)).expect("b");
    editor.toggle_selection(&a).expect("select");
    editor.toggle_selection(&b).expect("select");
    let merged = editor.join_tables().expect("join").expect("merged").table;

    let mut seen = Vec::new();
    for _ in 0..8 {
        editor.rotate(&merged).expect("rotate");
        seen.push(editor.scene().get(&merged).expect("merged").transform.rotation);
    }
    assert_eq!(seen, vec![45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0, 0.0]);
}

#[test]
fn removing_selected_table_leaves_no_stale_id() {
    let mut editor = editor();
    let a = editor.insert_element(table(0.0, 0.0, 60.0)).expect("a");
    let b = editor.insert_element(table(100.0, 0.0, 60.0)).expect("b");
    editor.toggle_selection(&a).expect("select");
    editor.toggle_selection(&b).expect("select");

    editor.remove(&a).expect("remove").expect("was present");
    assert!(editor.scene().get(&a).is_none());
    assert_eq!(editor.scene().selection().ids(), &[b]);
    assert!(editor.join_tables().expect("join").is_none());
}

#[test]
fn zero_size_canvas_blocks_gesture_without_error() {
    let mut editor = Editor::default();
    editor.set_canvas_rect(CanvasRect::new(0.0, 0.0, 0.0, 0.0));
    let id = editor.insert_element(table(0.0, 0.0, 60.0)).expect("insert");

    let actions = editor.pointer_down(Point::new(10.0, 10.0), Some(PointerTarget::Element(id)));
    assert!(matches!(actions.as_slice(), [Action::Rejected(_)]));
    assert_eq!(editor.gesture(), GestureState::Idle);

    editor.pointer_move(Point::new(90.0, 90.0));
    editor.pointer_up(Point::new(90.0, 90.0));
    let t = editor.scene().get(&id).expect("table").transform;
    assert_eq!((t.x, t.y), (0.0, 0.0));
    assert!(t.x.is_finite() && t.y.is_finite());

    // background pans are refused too
    editor.pointer_down(Point::new(10.0, 10.0), None);
    editor.pointer_move(Point::new(50.0, 50.0));
    assert_eq!(editor.viewport().pan(), Point::new(0.0, 0.0));
}
