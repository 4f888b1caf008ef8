//! The editing session: one layout, its view, and the gesture in progress.

use std::rc::Rc;

use crate::element::{Element, ElementId, ElementType};
use crate::error::{CanvasError, CanvasResult};
use crate::event::{CanvasRect, PointerEvent, PointerTarget, TouchEvent, WheelEvent};
use crate::interaction::{
    Action, CaptureHost, GestureState, InteractionConfig, InteractionController, Surface,
};
use crate::join::{join_selected, JoinOutcome};
use crate::library::LayoutLibrary;
use crate::persistence::LayoutRepository;
use crate::scene::Scene;
use crate::schema::LayoutDocument;
use crate::state::{EditorMode, SaveStatus};
use crate::viewport::{Point, ViewTransform, Viewport};

/// An interactive layout editor.
#[derive(Debug)]
pub struct Editor {
    scene: Scene,
    viewport: Viewport,
    controller: InteractionController,
    rect: Option<CanvasRect>,
    mode: EditorMode,
    status: SaveStatus,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl Editor {
    /// An empty editor in build mode.
    #[must_use]
    pub fn new(config: InteractionConfig) -> Self {
        Self::from_parts(config, InteractionController::new(config))
    }

    /// An empty editor whose gestures capture global pointer events on
    /// `host`.
    #[must_use]
    pub fn with_capture_host(config: InteractionConfig, host: Rc<dyn CaptureHost>) -> Self {
        Self::from_parts(config, InteractionController::with_host(config, host))
    }

    fn from_parts(config: InteractionConfig, controller: InteractionController) -> Self {
        Self {
            scene: Scene::new(),
            viewport: Viewport::with_zoom_bounds(config.min_zoom, config.max_zoom),
            controller,
            rect: None,
            mode: EditorMode::Build,
            status: SaveStatus::Clean,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The element store.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The live viewport.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable viewport access, e.g. to subscribe renderers.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Current zoom and pan.
    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.viewport.transform()
    }

    /// The gesture in progress.
    #[must_use]
    pub fn gesture(&self) -> GestureState {
        self.controller.state()
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Whether there are unsaved changes.
    #[must_use]
    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// Last measured canvas bounds.
    #[must_use]
    pub fn canvas_rect(&self) -> Option<CanvasRect> {
        self.rect
    }

    /// Record the canvas container's client-space bounds.
    pub fn set_canvas_rect(&mut self, rect: CanvasRect) {
        self.rect = Some(rect);
    }

    /// Switch mode, abandoning any gesture in progress.
    pub fn set_mode(&mut self, mode: EditorMode) {
        if mode != self.mode {
            tracing::debug!("Editor mode {} -> {mode}", self.mode);
            self.controller.cancel();
            self.mode = mode;
        }
    }

    fn require_arrange(&self) -> CanvasResult<()> {
        if self.mode.can_arrange() {
            Ok(())
        } else {
            Err(CanvasError::ReadOnly(self.mode))
        }
    }

    fn touched(&mut self) {
        self.status = SaveStatus::Dirty;
    }

    // ------------------------------------------------------------------
    // Layout editing
    // ------------------------------------------------------------------

    /// Create an element of `element_type` centred in the visible canvas.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ReadOnly`] outside build mode and
    /// [`CanvasError::InvalidElement`] when the canvas bounds are unknown or
    /// zero-sized. Nothing is inserted on error.
    pub fn add_element(&mut self, element_type: ElementType) -> CanvasResult<ElementId> {
        self.require_arrange()?;
        let rect = self
            .rect
            .filter(CanvasRect::is_measurable)
            .ok_or_else(|| CanvasError::InvalidElement("canvas bounds unavailable".into()))?;
        let transform = self.viewport.transform();
        let id = self
            .scene
            .create(element_type, Some(rect.local_center()), &transform)
            .map(|e| e.id)
            .ok_or_else(|| {
                CanvasError::InvalidElement(format!("cannot place {element_type} at canvas centre"))
            })?;
        self.touched();
        Ok(id)
    }

    /// Insert a fully built element.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ReadOnly`] outside build mode and
    /// [`CanvasError::InvalidElement`] for invalid or duplicate elements.
    pub fn insert_element(&mut self, element: Element) -> CanvasResult<ElementId> {
        self.require_arrange()?;
        let id = self.scene.add(element)?;
        self.touched();
        Ok(id)
    }

    /// Toggle a table in the join selection.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ReadOnly`] outside build mode.
    pub fn toggle_selection(&mut self, id: &ElementId) -> CanvasResult<bool> {
        self.require_arrange()?;
        Ok(self.scene.toggle_selection(id))
    }

    /// Deselect all tables.
    pub fn clear_selection(&mut self) {
        self.scene.clear_selection();
    }

    /// Join the selected tables. Fewer than two selected is a no-op that
    /// returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ReadOnly`] outside build mode.
    pub fn join_tables(&mut self) -> CanvasResult<Option<JoinOutcome>> {
        self.require_arrange()?;
        let outcome = join_selected(&mut self.scene);
        if outcome.is_some() {
            self.touched();
        }
        Ok(outcome)
    }

    /// Move an element to a model position.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ReadOnly`] outside build mode.
    pub fn move_element(&mut self, id: &ElementId, x: f64, y: f64) -> CanvasResult<bool> {
        self.require_arrange()?;
        let moved = self.scene.move_to(id, x, y);
        if moved {
            self.touched();
        }
        Ok(moved)
    }

    /// Rotate an element by one 45° step.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ReadOnly`] outside build mode.
    pub fn rotate(&mut self, id: &ElementId) -> CanvasResult<bool> {
        self.require_arrange()?;
        let rotated = self.scene.rotate(id);
        if rotated {
            self.touched();
        }
        Ok(rotated)
    }

    /// Rename an element.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ReadOnly`] outside build mode.
    pub fn rename(&mut self, id: &ElementId, name: impl Into<String>) -> CanvasResult<bool> {
        self.require_arrange()?;
        let renamed = self.scene.rename(id, name);
        if renamed {
            self.touched();
        }
        Ok(renamed)
    }

    /// Remove an element (and its selection entry).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ReadOnly`] outside build mode.
    pub fn remove(&mut self, id: &ElementId) -> CanvasResult<Option<Element>> {
        self.require_arrange()?;
        let removed = self.scene.remove(id);
        if removed.is_some() {
            self.touched();
        }
        Ok(removed)
    }

    /// Seat a guest on a chair, or clear it with `None` / a blank name.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ReadOnly`] outside assign mode, and
    /// [`CanvasError::ElementNotFound`] / [`CanvasError::NotASeat`] for bad
    /// targets.
    pub fn assign_guest(&mut self, seat: &ElementId, guest: Option<&str>) -> CanvasResult<()> {
        if !self.mode.can_assign() {
            return Err(CanvasError::ReadOnly(self.mode));
        }
        self.scene.assign_guest(seat, guest)?;
        self.touched();
        Ok(())
    }

    /// Replace the whole layout, e.g. after a successful load. Clears the
    /// selection, ends any gesture and marks the layout clean.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidElement`] if any element is invalid; the
    /// editor is unchanged in that case.
    pub fn replace_elements(&mut self, elements: Vec<Element>) -> CanvasResult<()> {
        self.scene.replace_all(elements)?;
        self.controller.cancel();
        self.status = SaveStatus::Clean;
        Ok(())
    }

    /// Owned copy of the layout, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Element> {
        self.scene.snapshot()
    }

    /// The layout as a named document.
    #[must_use]
    pub fn document(&self, name: &str) -> LayoutDocument {
        LayoutDocument::from_elements(name, &self.snapshot())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Save the layout through `library`. On failure the editor keeps its
    /// elements and previous status.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Persistence`] if the save fails.
    pub async fn save_to<R>(&mut self, library: &LayoutLibrary<R>, name: &str) -> CanvasResult<()>
    where
        R: LayoutRepository + ?Sized,
    {
        let elements = self.snapshot();
        let previous = self.status;
        self.status = SaveStatus::Saving;
        match library.save(name, &elements).await {
            Ok(()) => {
                self.status = SaveStatus::Clean;
                Ok(())
            }
            Err(e) => {
                self.status = previous;
                Err(e.into())
            }
        }
    }

    /// Load a layout through `library`, replacing the current one only on
    /// success.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Persistence`] if the load fails and
    /// [`CanvasError::InvalidElement`] if the stored layout is invalid.
    pub async fn load_from<R>(&mut self, library: &LayoutLibrary<R>, name: &str) -> CanvasResult<()>
    where
        R: LayoutRepository + ?Sized,
    {
        let elements = library.load(name).await?;
        self.replace_elements(elements)
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    fn dispatch(
        &mut self,
        f: impl FnOnce(&mut InteractionController, &mut Surface<'_>) -> Vec<Action>,
    ) -> Vec<Action> {
        let mut surface = Surface {
            scene: &mut self.scene,
            viewport: &mut self.viewport,
            rect: self.rect.unwrap_or_default(),
            mode: self.mode,
        };
        let actions = f(&mut self.controller, &mut surface);
        if actions.iter().any(|a| matches!(a, Action::Moved { .. })) {
            self.touched();
        }
        actions
    }

    /// Handle a pointer event.
    pub fn pointer(&mut self, event: &PointerEvent) -> Vec<Action> {
        self.dispatch(|c, s| c.pointer(s, event))
    }

    /// Pointer pressed at a client position. The target is resolved by hit
    /// testing the layout when the host does not know it.
    pub fn pointer_down(&mut self, client: Point, target: Option<PointerTarget>) -> Vec<Action> {
        let target = target.unwrap_or_else(|| self.hit_test(client));
        self.dispatch(|c, s| c.pointer_down(s, client, target))
    }

    /// Pointer moved to a client position.
    pub fn pointer_move(&mut self, client: Point) -> Vec<Action> {
        self.dispatch(|c, s| c.pointer_move(s, client))
    }

    /// Pointer released at a client position.
    pub fn pointer_up(&mut self, client: Point) -> Vec<Action> {
        self.dispatch(|c, s| c.pointer_up(s, Some(client)))
    }

    /// Handle a wheel event.
    pub fn wheel(&mut self, event: &WheelEvent) -> Vec<Action> {
        self.dispatch(|c, s| c.wheel(s, event))
    }

    /// Handle a touch event.
    pub fn touch(&mut self, event: &TouchEvent) -> Vec<Action> {
        self.dispatch(|c, s| c.touch(s, event))
    }

    /// Abandon the gesture in progress.
    pub fn cancel_gesture(&mut self) {
        self.controller.cancel();
    }

    /// Return to zoom 1 and no pan.
    pub fn reset_view(&mut self) -> bool {
        self.viewport.reset()
    }

    /// What lies under a client position.
    #[must_use]
    pub fn hit_test(&self, client: Point) -> PointerTarget {
        let Some(rect) = self.rect.filter(CanvasRect::is_measurable) else {
            return PointerTarget::Background;
        };
        let model = self.viewport.screen_to_model(rect.to_local(client));
        self.scene
            .element_at(model)
            .map_or(PointerTarget::Background, PointerTarget::Element)
    }
}
