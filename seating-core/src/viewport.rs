//! Viewport transform: zoom, pan, and screen/model coordinate conversion.
//!
//! Screen coordinates are CSS pixels relative to the canvas container's
//! top-left corner. Model coordinates are the persisted layout units and do
//! not depend on zoom or pan.
//!
//! ```text
//! screen = model * zoom + pan
//! model  = (screen - pan) / zoom
//! ```
//!
//! [`ViewTransform`] is the plain `Copy` snapshot used by all geometry math.
//! [`Viewport`] owns the live value and notifies subscribers synchronously on
//! every effective change, so nothing downstream can act on a stale zoom.

use std::ops::{Add, Sub};

use crate::element::Transform;

/// Lower zoom bound.
pub const MIN_ZOOM: f64 = 0.5;
/// Upper zoom bound.
pub const MAX_ZOOM: f64 = 2.0;
/// Zoom level on mount.
pub const DEFAULT_ZOOM: f64 = 1.0;

/// A point in either screen or model space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length when treated as a vector.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Whether both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned rectangle in screen pixels, as handed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Rotation in degrees around the rectangle centre.
    pub rotation: f64,
}

/// Zoom and pan at one instant.
///
/// `pan_x` / `pan_y` are screen pixels. `zoom` is a scale factor
/// (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Scale factor.
    pub zoom: f64,
    /// Horizontal content offset in screen pixels.
    pub pan_x: f64,
    /// Vertical content offset in screen pixels.
    pub pan_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl ViewTransform {
    /// Convert a screen-space point to model coordinates.
    #[must_use]
    pub fn screen_to_model(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a model-space point to screen coordinates.
    #[must_use]
    pub fn model_to_screen(&self, model: Point) -> Point {
        Point {
            x: model.x * self.zoom + self.pan_x,
            y: model.y * self.zoom + self.pan_y,
        }
    }

    /// Screen rectangle covered by an element's geometry.
    #[must_use]
    pub fn project(&self, transform: &Transform) -> ScreenRect {
        let origin = self.model_to_screen(Point::new(transform.x, transform.y));
        ScreenRect {
            left: origin.x,
            top: origin.y,
            width: transform.width * self.zoom,
            height: transform.height * self.zoom,
            rotation: transform.rotation,
        }
    }
}

/// Handle returned by [`Viewport::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(ViewTransform)>;

/// The live zoom/pan state of a canvas view.
///
/// Not persisted; reset each time the view mounts.
pub struct Viewport {
    current: ViewTransform,
    min_zoom: f64,
    max_zoom: f64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("current", &self.current)
            .field("min_zoom", &self.min_zoom)
            .field("max_zoom", &self.max_zoom)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// A viewport at identity with the default zoom bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_zoom_bounds(MIN_ZOOM, MAX_ZOOM)
    }

    /// A viewport at identity clamping zoom to `[min_zoom, max_zoom]`.
    ///
    /// Bounds are swapped if given in the wrong order.
    #[must_use]
    pub fn with_zoom_bounds(min_zoom: f64, max_zoom: f64) -> Self {
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        Self {
            current: ViewTransform {
                zoom: DEFAULT_ZOOM.clamp(min_zoom, max_zoom),
                ..ViewTransform::default()
            },
            min_zoom,
            max_zoom,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current transform snapshot.
    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.current
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.current.zoom
    }

    /// Current pan offset.
    #[must_use]
    pub fn pan(&self) -> Point {
        Point::new(self.current.pan_x, self.current.pan_y)
    }

    /// Zoom bounds as `(min, max)`.
    #[must_use]
    pub fn zoom_bounds(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// See [`ViewTransform::screen_to_model`].
    #[must_use]
    pub fn screen_to_model(&self, screen: Point) -> Point {
        self.current.screen_to_model(screen)
    }

    /// See [`ViewTransform::model_to_screen`].
    #[must_use]
    pub fn model_to_screen(&self, model: Point) -> Point {
        self.current.model_to_screen(model)
    }

    /// Register a listener called after every effective change.
    pub fn subscribe(&mut self, listener: impl FnMut(ViewTransform) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Add `delta` to the zoom factor, clamped to the bounds. Zoom is
    /// anchored at the content origin. Returns whether the zoom changed.
    pub fn apply_zoom_delta(&mut self, delta: f64) -> bool {
        if !delta.is_finite() {
            return false;
        }
        let zoom = (self.current.zoom + delta).clamp(self.min_zoom, self.max_zoom);
        self.commit(ViewTransform {
            zoom,
            ..self.current
        })
    }

    /// Add `delta` to the zoom factor while keeping the model point under
    /// `anchor` (screen space) fixed on screen. Returns whether anything
    /// changed.
    pub fn zoom_at(&mut self, anchor: Point, delta: f64) -> bool {
        if !delta.is_finite() || !anchor.is_finite() {
            return false;
        }
        let zoom = (self.current.zoom + delta).clamp(self.min_zoom, self.max_zoom);
        let fixed = self.current.screen_to_model(anchor);
        self.commit(ViewTransform {
            zoom,
            pan_x: anchor.x - fixed.x * zoom,
            pan_y: anchor.y - fixed.y * zoom,
        })
    }

    /// Translate the content by a screen-space delta. Unbounded.
    pub fn apply_pan(&mut self, dx: f64, dy: f64) -> bool {
        if !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        self.commit(ViewTransform {
            pan_x: self.current.pan_x + dx,
            pan_y: self.current.pan_y + dy,
            ..self.current
        })
    }

    /// Return to zoom 1 and no pan.
    pub fn reset(&mut self) -> bool {
        self.commit(ViewTransform {
            zoom: DEFAULT_ZOOM.clamp(self.min_zoom, self.max_zoom),
            ..ViewTransform::default()
        })
    }

    fn commit(&mut self, next: ViewTransform) -> bool {
        if next == self.current {
            return false;
        }
        self.current = next;
        for (_, listener) in &mut self.listeners {
            listener(next);
        }
        true
    }
}
