//! WebAssembly bindings for seating-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! Input handlers return the resulting actions as a JSON array so the page
//! can re-render only what changed.

use std::rc::Rc;

use serde_json::{json, Value};
use wasm_bindgen::prelude::*;

use crate::{
    suggest_guests, Action, CanvasRect, CaptureHost, Editor, EditorMode, ElementId, ElementType,
    GestureRejection, InteractionConfig, LayoutDocument, Point, PointerTarget, TouchEvent,
    TouchPhase, TouchPoint, WheelEvent, ZoomAnchor,
};

/// Initialize the seating WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Calls back into the page to attach and detach window-level pointer
/// listeners.
struct JsCaptureHost {
    on_capture: js_sys::Function,
    on_release: js_sys::Function,
}

impl CaptureHost for JsCaptureHost {
    fn capture(&self) {
        if let Err(e) = self.on_capture.call0(&JsValue::NULL) {
            tracing::warn!("capture callback failed: {e:?}");
        }
    }

    fn release(&self) {
        if let Err(e) = self.on_release.call0(&JsValue::NULL) {
            tracing::warn!("release callback failed: {e:?}");
        }
    }
}

fn parse_id(id: &str) -> Result<ElementId, String> {
    ElementId::parse(id).map_err(|e| format!("invalid element id {id:?}: {e}"))
}

fn parse_type(element_type: &str) -> Result<ElementType, String> {
    match element_type {
        "table" => Ok(ElementType::Table),
        "chair" => Ok(ElementType::Chair),
        "other" => Ok(ElementType::Other),
        other => Err(format!("unknown element type {other:?}")),
    }
}

fn target_of(id: Option<String>) -> Result<Option<PointerTarget>, String> {
    id.map(|id| parse_id(&id).map(PointerTarget::Element))
        .transpose()
}

fn action_json(action: &Action) -> Value {
    match action {
        Action::Panned { dx, dy } => json!({ "type": "panned", "dx": dx, "dy": dy }),
        Action::Zoomed { zoom } => json!({ "type": "zoomed", "zoom": zoom }),
        Action::Moved { id } => json!({ "type": "moved", "id": id }),
        Action::SelectionChanged => json!({ "type": "selectionChanged" }),
        Action::SeatChosen { id } => json!({ "type": "seatChosen", "id": id }),
        Action::SeatInspected { id } => json!({ "type": "seatInspected", "id": id }),
        Action::Rejected(GestureRejection::DegenerateCanvas { width, height }) => {
            json!({ "type": "rejected", "width": width, "height": height })
        }
    }
}

fn actions_json(actions: &[Action]) -> String {
    Value::Array(actions.iter().map(action_json).collect()).to_string()
}

/// Layout editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create a new editor with origin-anchored wheel zoom.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            editor: Editor::default(),
        }
    }

    /// Create an editor that calls `capture` when a gesture starts and
    /// `release` when it ends, on every exit path.
    #[wasm_bindgen(js_name = withCaptureCallbacks)]
    #[must_use]
    pub fn with_capture_callbacks(
        capture: js_sys::Function,
        release: js_sys::Function,
        zoom_to_cursor: bool,
    ) -> Self {
        let config = InteractionConfig {
            zoom_anchor: if zoom_to_cursor {
                ZoomAnchor::Cursor
            } else {
                ZoomAnchor::Origin
            },
            ..InteractionConfig::default()
        };
        let host = Rc::new(JsCaptureHost {
            on_capture: capture,
            on_release: release,
        });
        Self {
            editor: Editor::with_capture_host(config, host),
        }
    }

    /// Record the canvas container's client-space bounds.
    #[wasm_bindgen(js_name = setCanvasRect)]
    pub fn set_canvas_rect(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.editor
            .set_canvas_rect(CanvasRect::new(left, top, width, height));
    }

    /// Measure the canvas container element.
    #[wasm_bindgen(js_name = measureCanvas)]
    pub fn measure_canvas(&mut self, element: &web_sys::Element) {
        let rect = element.get_bounding_client_rect();
        self.set_canvas_rect(rect.left(), rect.top(), rect.width(), rect.height());
    }

    /// Switch between `build`, `assign` and `view`.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown modes.
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), String> {
        let mode: EditorMode = mode.parse()?;
        self.editor.set_mode(mode);
        Ok(())
    }

    /// Current mode name.
    #[must_use]
    pub fn mode(&self) -> String {
        self.editor.mode().to_string()
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.editor.transform().zoom
    }

    /// Horizontal pan offset in screen pixels.
    #[wasm_bindgen(js_name = panX)]
    #[must_use]
    pub fn pan_x(&self) -> f64 {
        self.editor.transform().pan_x
    }

    /// Vertical pan offset in screen pixels.
    #[wasm_bindgen(js_name = panY)]
    #[must_use]
    pub fn pan_y(&self) -> f64 {
        self.editor.transform().pan_y
    }

    /// Whether the layout has unsaved changes.
    #[wasm_bindgen(js_name = isDirty)]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.editor.status() != crate::SaveStatus::Clean
    }

    /// Pointer pressed. `target_id` is the element under the pointer, or
    /// `undefined` to hit-test.
    ///
    /// # Errors
    ///
    /// Returns an error string if `target_id` is not an element id.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(
        &mut self,
        x: f64,
        y: f64,
        target_id: Option<String>,
    ) -> Result<String, String> {
        let target = target_of(target_id)?;
        Ok(actions_json(&self.editor.pointer_down(Point::new(x, y), target)))
    }

    /// Pointer moved.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> String {
        actions_json(&self.editor.pointer_move(Point::new(x, y)))
    }

    /// Pointer released.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) -> String {
        actions_json(&self.editor.pointer_up(Point::new(x, y)))
    }

    /// Wheel scrolled.
    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> String {
        actions_json(&self.editor.wheel(&WheelEvent { x, y, delta_y }))
    }

    /// Forward a DOM touch event. `phase` is `start`, `move`, `end` or
    /// `cancel`.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown phases or target ids.
    #[wasm_bindgen(js_name = touch)]
    pub fn touch(
        &mut self,
        event: &web_sys::TouchEvent,
        phase: &str,
        target_id: Option<String>,
    ) -> Result<String, String> {
        let phase = match phase {
            "start" => TouchPhase::Start,
            "move" => TouchPhase::Move,
            "end" => TouchPhase::End,
            "cancel" => TouchPhase::Cancel,
            other => return Err(format!("unknown touch phase {other:?}")),
        };
        let list = event.touches();
        let touches = (0..list.length())
            .filter_map(|i| list.item(i))
            .map(|t| TouchPoint {
                id: u32::try_from(t.identifier()).unwrap_or_default(),
                x: f64::from(t.client_x()),
                y: f64::from(t.client_y()),
            })
            .collect();
        let mut touch = TouchEvent::new(phase, touches);
        if let Some(target) = target_of(target_id)? {
            touch = touch.on(target);
        }
        Ok(actions_json(&self.editor.touch(&touch)))
    }

    /// Abandon the gesture in progress.
    #[wasm_bindgen(js_name = cancelGesture)]
    pub fn cancel_gesture(&mut self) {
        self.editor.cancel_gesture();
    }

    /// Return to zoom 1 and no pan.
    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&mut self) {
        self.editor.reset_view();
    }

    /// Add a `table`, `chair` or `other` in the centre of the canvas.
    ///
    /// # Errors
    ///
    /// Returns an error string if the canvas is not measured, the mode is
    /// read-only, or the type is unknown.
    #[wasm_bindgen(js_name = addElement)]
    pub fn add_element(&mut self, element_type: &str) -> Result<String, String> {
        let element_type = parse_type(element_type)?;
        self.editor
            .add_element(element_type)
            .map(|id| id.to_string())
            .map_err(|e| e.to_string())
    }

    /// Toggle a table in the join selection.
    ///
    /// # Errors
    ///
    /// Returns an error string for bad ids or read-only modes.
    #[wasm_bindgen(js_name = toggleSelection)]
    pub fn toggle_selection(&mut self, id: &str) -> Result<bool, String> {
        let id = parse_id(id)?;
        self.editor.toggle_selection(&id).map_err(|e| e.to_string())
    }

    /// Selected table ids as a JSON array.
    #[must_use]
    pub fn selection(&self) -> String {
        json!(self.editor.scene().selection().ids()).to_string()
    }

    /// Join the selected tables. Returns the merged table id, or
    /// `undefined` when fewer than two tables are selected.
    ///
    /// # Errors
    ///
    /// Returns an error string in read-only modes.
    #[wasm_bindgen(js_name = joinTables)]
    pub fn join_tables(&mut self) -> Result<Option<String>, String> {
        self.editor
            .join_tables()
            .map(|outcome| outcome.map(|o| o.table.to_string()))
            .map_err(|e| e.to_string())
    }

    /// Rotate an element by 45°.
    ///
    /// # Errors
    ///
    /// Returns an error string for bad ids or read-only modes.
    pub fn rotate(&mut self, id: &str) -> Result<bool, String> {
        let id = parse_id(id)?;
        self.editor.rotate(&id).map_err(|e| e.to_string())
    }

    /// Rename an element.
    ///
    /// # Errors
    ///
    /// Returns an error string for bad ids or read-only modes.
    pub fn rename(&mut self, id: &str, name: &str) -> Result<bool, String> {
        let id = parse_id(id)?;
        self.editor.rename(&id, name).map_err(|e| e.to_string())
    }

    /// Remove an element.
    ///
    /// # Errors
    ///
    /// Returns an error string for bad ids or read-only modes.
    pub fn remove(&mut self, id: &str) -> Result<bool, String> {
        let id = parse_id(id)?;
        self.editor
            .remove(&id)
            .map(|removed| removed.is_some())
            .map_err(|e| e.to_string())
    }

    /// Seat a guest on a chair; an empty name clears the seat.
    ///
    /// # Errors
    ///
    /// Returns an error string for bad ids, non-chairs or the wrong mode.
    #[wasm_bindgen(js_name = assignGuest)]
    pub fn assign_guest(&mut self, id: &str, guest: &str) -> Result<(), String> {
        let id = parse_id(id)?;
        self.editor
            .assign_guest(&id, Some(guest))
            .map_err(|e| e.to_string())
    }

    /// Guests from a JSON array of names that match `query` and are not
    /// seated yet, as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error string if `all_json` is not an array of strings.
    #[wasm_bindgen(js_name = suggestGuests)]
    pub fn suggest_guests(&self, all_json: &str, query: &str) -> Result<String, String> {
        let all: Vec<String> = serde_json::from_str(all_json).map_err(|e| e.to_string())?;
        Ok(json!(suggest_guests(&all, self.editor.scene(), query)).to_string())
    }

    /// Screen rectangles of every element, in render order, as JSON.
    #[wasm_bindgen(js_name = screenRects)]
    #[must_use]
    pub fn screen_rects(&self) -> String {
        let view = self.editor.transform();
        let selection = self.editor.scene().selection();
        let rects: Vec<Value> = self
            .editor
            .scene()
            .list()
            .map(|e| {
                let r = view.project(&e.transform);
                json!({
                    "id": e.id,
                    "type": e.element_type(),
                    "name": e.name,
                    "guest": e.guest(),
                    "selected": selection.contains(&e.id),
                    "left": r.left,
                    "top": r.top,
                    "width": r.width,
                    "height": r.height,
                    "rotation": r.rotation,
                })
            })
            .collect();
        Value::Array(rects).to_string()
    }

    /// The layout as a JSON document under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error string if the layout cannot be serialized.
    #[wasm_bindgen(js_name = layoutJson)]
    pub fn layout_json(&self, name: &str) -> Result<String, String> {
        self.editor.document(name).to_json().map_err(|e| e.to_string())
    }

    /// Replace the layout from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error string if parsing or validation fails; the layout is
    /// unchanged in that case.
    #[wasm_bindgen(js_name = loadLayoutJson)]
    pub fn load_layout_json(&mut self, json: &str) -> Result<(), String> {
        let document = LayoutDocument::from_json(json).map_err(|e| e.to_string())?;
        let elements = document.into_elements().map_err(|e| e.to_string())?;
        self.editor
            .replace_elements(elements)
            .map_err(|e| e.to_string())
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}
