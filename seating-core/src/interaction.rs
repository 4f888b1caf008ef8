//! Pointer, wheel and touch gesture handling.
//!
//! The controller is a small state machine:
//!
//! ```text
//! Idle --down on background--> PanningCanvas --up/cancel--> Idle
//! Idle --down on element-----> DraggingElement --up/cancel--> Idle
//! ```
//!
//! Wheel zoom is legal in every state and never changes it. While a gesture
//! is active the controller holds a [`CaptureGuard`]; dropping the guard on
//! any exit path tells the host to deregister its global move/up listeners.

use std::rc::Rc;

use crate::element::{ElementId, ElementType};
use crate::error::CanvasError;
use crate::event::{
    CanvasRect, PointerEvent, PointerPhase, PointerTarget, TouchEvent, TouchPhase, WheelEvent,
};
use crate::scene::Scene;
use crate::state::EditorMode;
use crate::viewport::{Point, Viewport, MAX_ZOOM, MIN_ZOOM};

/// Zoom change per wheel event.
pub const WHEEL_ZOOM_STEP: f64 = 0.01;

/// Pointer travel, in screen pixels, below which a press counts as a click.
pub const CLICK_SLOP: f64 = 4.0;

/// Where wheel zoom is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoomAnchor {
    /// Scale about the content origin; the pan offset is left alone.
    #[default]
    Origin,
    /// Keep the model point under the cursor fixed on screen.
    Cursor,
}

/// Tuning for gesture handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    /// Lower zoom bound.
    pub min_zoom: f64,
    /// Upper zoom bound.
    pub max_zoom: f64,
    /// Zoom change per wheel event.
    pub wheel_step: f64,
    /// Wheel zoom anchor.
    pub zoom_anchor: ZoomAnchor,
    /// Maximum pointer travel for a press to count as a click.
    pub click_slop: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            wheel_step: WHEEL_ZOOM_STEP,
            zoom_anchor: ZoomAnchor::Origin,
            click_slop: CLICK_SLOP,
        }
    }
}

/// The active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the canvas itself.
    PanningCanvas {
        /// Canvas-local pointer position at the previous event.
        last: Point,
        /// Canvas-local pointer position at pointer-down.
        start: Point,
        /// Element under the pointer at pointer-down, if it may be clicked.
        pressed: Option<ElementId>,
        /// Furthest distance from `start` seen so far.
        travel: f64,
    },
    /// Moving one element.
    DraggingElement {
        /// Element being dragged.
        id: ElementId,
        /// Pointer position minus the element's screen origin, captured once
        /// at pointer-down.
        offset: Point,
        /// Canvas-local pointer position at pointer-down.
        start: Point,
        /// Furthest distance from `start` seen so far.
        travel: f64,
    },
}

impl GestureState {
    /// Whether no gesture is in progress.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Why a gesture was not started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureRejection {
    /// The canvas container measured zero (or non-finite) on some axis.
    DegenerateCanvas {
        /// Measured width.
        width: f64,
        /// Measured height.
        height: f64,
    },
}

impl From<GestureRejection> for CanvasError {
    fn from(rejection: GestureRejection) -> Self {
        match rejection {
            GestureRejection::DegenerateCanvas { width, height } => {
                Self::GeometryDegenerate { width, height }
            }
        }
    }
}

/// Observable outcome of an input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// The viewport pan changed by this screen delta.
    Panned {
        /// Horizontal delta.
        dx: f64,
        /// Vertical delta.
        dy: f64,
    },
    /// The zoom factor changed.
    Zoomed {
        /// New zoom factor.
        zoom: f64,
    },
    /// An element was moved.
    Moved {
        /// The moved element.
        id: ElementId,
    },
    /// Table selection changed.
    SelectionChanged,
    /// A chair was clicked while assigning guests.
    SeatChosen {
        /// The chair.
        id: ElementId,
    },
    /// A chair was clicked in the read-only view.
    SeatInspected {
        /// The chair.
        id: ElementId,
    },
    /// The gesture was refused and nothing changed.
    Rejected(GestureRejection),
}

/// Global pointer listeners owned by the host (e.g. window-level
/// `mousemove`/`mouseup` in a browser).
pub trait CaptureHost {
    /// Start routing pointer move/up events to the controller.
    fn capture(&self);

    /// Stop routing them.
    fn release(&self);
}

/// A host with nothing to register.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCapture;

impl CaptureHost for NoopCapture {
    fn capture(&self) {}

    fn release(&self) {}
}

/// Held for the lifetime of a gesture; releases the host's listeners when
/// dropped.
pub struct CaptureGuard {
    host: Rc<dyn CaptureHost>,
}

impl CaptureGuard {
    /// Capture on `host` until the guard is dropped.
    #[must_use]
    pub fn acquire(host: Rc<dyn CaptureHost>) -> Self {
        host.capture();
        Self { host }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.host.release();
    }
}

impl std::fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureGuard").finish_non_exhaustive()
    }
}

/// Everything a gesture may read or mutate.
#[derive(Debug)]
pub struct Surface<'a> {
    /// Element store and selection.
    pub scene: &'a mut Scene,
    /// Live zoom and pan.
    pub viewport: &'a mut Viewport,
    /// Client-space bounds of the canvas container.
    pub rect: CanvasRect,
    /// Current editor mode.
    pub mode: EditorMode,
}

/// Turns raw input into viewport and element updates.
pub struct InteractionController {
    config: InteractionConfig,
    state: GestureState,
    host: Rc<dyn CaptureHost>,
    capture: Option<CaptureGuard>,
    touch_id: Option<u32>,
}

impl std::fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("captured", &self.capture.is_some())
            .field("touch_id", &self.touch_id)
            .finish()
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl InteractionController {
    /// A controller with no capture host.
    #[must_use]
    pub fn new(config: InteractionConfig) -> Self {
        Self::with_host(config, Rc::new(NoopCapture))
    }

    /// A controller that captures global pointer events on `host` during
    /// gestures.
    #[must_use]
    pub fn with_host(config: InteractionConfig, host: Rc<dyn CaptureHost>) -> Self {
        Self {
            config,
            state: GestureState::Idle,
            host,
            capture: None,
            touch_id: None,
        }
    }

    /// Gesture tuning.
    #[must_use]
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// The active gesture.
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Whether global listeners are currently held.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    /// Dispatch a pointer event by phase.
    pub fn pointer(&mut self, surface: &mut Surface<'_>, event: &PointerEvent) -> Vec<Action> {
        match event.phase {
            PointerPhase::Down => self.pointer_down(surface, event.position(), event.target),
            PointerPhase::Move => self.pointer_move(surface, event.position()),
            PointerPhase::Up => self.pointer_up(surface, Some(event.position())),
        }
    }

    /// Start a gesture at a client position.
    ///
    /// A container that is not measurable rejects the gesture without
    /// touching any state.
    pub fn pointer_down(
        &mut self,
        surface: &mut Surface<'_>,
        client: Point,
        target: PointerTarget,
    ) -> Vec<Action> {
        if !surface.rect.is_measurable() {
            let rejection = GestureRejection::DegenerateCanvas {
                width: surface.rect.width,
                height: surface.rect.height,
            };
            tracing::warn!(
                "Rejected gesture on degenerate canvas {}x{}",
                surface.rect.width,
                surface.rect.height
            );
            return vec![Action::Rejected(rejection)];
        }
        if !client.is_finite() {
            return Vec::new();
        }
        if !self.state.is_idle() {
            tracing::debug!("Pointer down during {:?}; ending previous gesture", self.state);
            self.cancel();
        }

        let local = surface.rect.to_local(client);
        let hit = match target {
            PointerTarget::Element(id) => surface.scene.get(&id),
            PointerTarget::Background => None,
        };

        self.state = match hit {
            Some(element) if surface.mode.can_arrange() => {
                let origin = surface
                    .viewport
                    .model_to_screen(Point::new(element.transform.x, element.transform.y));
                tracing::debug!("Drag start on {}", element.id);
                GestureState::DraggingElement {
                    id: element.id,
                    offset: local - origin,
                    start: local,
                    travel: 0.0,
                }
            }
            hit => {
                tracing::debug!("Pan start at ({}, {})", local.x, local.y);
                GestureState::PanningCanvas {
                    last: local,
                    start: local,
                    pressed: hit.map(|e| e.id),
                    travel: 0.0,
                }
            }
        };
        self.capture = Some(CaptureGuard::acquire(Rc::clone(&self.host)));
        Vec::new()
    }

    /// Continue the active gesture. No-op while idle.
    pub fn pointer_move(&mut self, surface: &mut Surface<'_>, client: Point) -> Vec<Action> {
        if self.state.is_idle() || !client.is_finite() || !surface.rect.is_measurable() {
            return Vec::new();
        }
        let local = surface.rect.to_local(client);

        let mut vanished = None;
        let actions = match &mut self.state {
            GestureState::Idle => Vec::new(),
            GestureState::PanningCanvas {
                last,
                start,
                travel,
                ..
            } => {
                let delta = local - *last;
                *last = local;
                *travel = travel.max((local - *start).length());
                if surface.viewport.apply_pan(delta.x, delta.y) {
                    vec![Action::Panned {
                        dx: delta.x,
                        dy: delta.y,
                    }]
                } else {
                    Vec::new()
                }
            }
            GestureState::DraggingElement {
                id,
                offset,
                start,
                travel,
            } => {
                *travel = travel.max((local - *start).length());
                let model = surface.viewport.screen_to_model(local - *offset);
                if surface.scene.move_to(id, model.x, model.y) {
                    vec![Action::Moved { id: *id }]
                } else {
                    if surface.scene.get(id).is_none() {
                        vanished = Some(*id);
                    }
                    Vec::new()
                }
            }
        };
        if let Some(id) = vanished {
            tracing::debug!("Dragged element {id} vanished; ending drag");
            self.cancel();
        }
        actions
    }

    /// Finish the active gesture, wherever the pointer is.
    ///
    /// A press that travelled no further than the click slop is treated as a
    /// click on the element it started on.
    pub fn pointer_up(&mut self, surface: &mut Surface<'_>, client: Option<Point>) -> Vec<Action> {
        let state = std::mem::take(&mut self.state);
        self.capture = None;
        self.touch_id = None;

        let local = client
            .filter(|p| p.is_finite() && surface.rect.is_measurable())
            .map(|p| surface.rect.to_local(p));
        let (clicked, start, travel) = match state {
            GestureState::Idle => return Vec::new(),
            GestureState::PanningCanvas {
                pressed,
                start,
                travel,
                ..
            } => (pressed, start, travel),
            GestureState::DraggingElement {
                id, start, travel, ..
            } => (Some(id), start, travel),
        };
        let travel = local.map_or(travel, |p| travel.max((p - start).length()));
        tracing::debug!("Gesture ended after {travel:.1}px");

        match clicked {
            Some(id) if travel <= self.config.click_slop => Self::click(surface, id),
            _ => Vec::new(),
        }
    }

    fn click(surface: &mut Surface<'_>, id: ElementId) -> Vec<Action> {
        let Some(element) = surface.scene.get(&id) else {
            return Vec::new();
        };
        let is_chair = element.element_type() == ElementType::Chair;
        match surface.mode {
            EditorMode::Build => {
                if surface.scene.toggle_selection(&id) {
                    vec![Action::SelectionChanged]
                } else {
                    Vec::new()
                }
            }
            EditorMode::Assign if is_chair => vec![Action::SeatChosen { id }],
            EditorMode::View if is_chair => vec![Action::SeatInspected { id }],
            EditorMode::Assign | EditorMode::View => Vec::new(),
        }
    }

    /// Abandon the active gesture without a click and release capture.
    pub fn cancel(&mut self) {
        if !self.state.is_idle() {
            tracing::debug!("Gesture cancelled");
        }
        self.state = GestureState::Idle;
        self.capture = None;
        self.touch_id = None;
    }

    /// Zoom by one wheel step. Scrolling down zooms out; a zero delta does
    /// nothing. The gesture state is never affected.
    pub fn wheel(&mut self, surface: &mut Surface<'_>, event: &WheelEvent) -> Vec<Action> {
        if !event.delta_y.is_finite() || event.delta_y == 0.0 {
            return Vec::new();
        }
        let step = if event.delta_y > 0.0 {
            -self.config.wheel_step
        } else {
            self.config.wheel_step
        };

        let changed = match self.config.zoom_anchor {
            ZoomAnchor::Cursor if surface.rect.is_measurable() => {
                let anchor = surface.rect.to_local(Point::new(event.x, event.y));
                surface.viewport.zoom_at(anchor, step)
            }
            _ => surface.viewport.apply_zoom_delta(step),
        };
        if changed {
            vec![Action::Zoomed {
                zoom: surface.viewport.zoom(),
            }]
        } else {
            Vec::new()
        }
    }

    /// Single-finger touch. Additional fingers are ignored.
    pub fn touch(&mut self, surface: &mut Surface<'_>, event: &TouchEvent) -> Vec<Action> {
        match event.phase {
            TouchPhase::Start => {
                if event.is_multi_touch() || self.touch_id.is_some() {
                    return Vec::new();
                }
                let Some(touch) = event.primary_touch() else {
                    return Vec::new();
                };
                let actions = self.pointer_down(surface, Point::new(touch.x, touch.y), event.target);
                if !self.state.is_idle() {
                    self.touch_id = Some(touch.id);
                }
                actions
            }
            TouchPhase::Move => {
                let Some(active) = self.touch_id else {
                    return Vec::new();
                };
                match event.touches.iter().find(|t| t.id == active) {
                    Some(touch) => self.pointer_move(surface, Point::new(touch.x, touch.y)),
                    None => Vec::new(),
                }
            }
            TouchPhase::End => {
                let Some(active) = self.touch_id else {
                    return Vec::new();
                };
                if event.touches.iter().any(|t| t.id == active) {
                    return Vec::new();
                }
                self.pointer_up(surface, None)
            }
            TouchPhase::Cancel => {
                self.cancel();
                Vec::new()
            }
        }
    }
}
