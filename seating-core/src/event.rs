//! Input events for canvas interaction.
//!
//! Coordinates are client (page) pixels as reported by the host; the
//! interaction controller subtracts the canvas origin itself.

use serde::{Deserialize, Serialize};

use crate::viewport::Point;
use crate::ElementId;

/// What a pointer landed on when it went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum PointerTarget {
    /// Empty canvas background.
    Background,
    /// The body of a placed element.
    Element(ElementId),
}

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
}

/// A mouse or pen event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// X position in client pixels.
    pub x: f64,
    /// Y position in client pixels.
    pub y: f64,
    /// Hit target; only meaningful on `Down`.
    pub target: PointerTarget,
}

impl PointerEvent {
    /// Pointer pressed on a target.
    #[must_use]
    pub const fn down(x: f64, y: f64, target: PointerTarget) -> Self {
        Self {
            phase: PointerPhase::Down,
            x,
            y,
            target,
        }
    }

    /// Pointer moved.
    #[must_use]
    pub const fn moved(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Move,
            x,
            y,
            target: PointerTarget::Background,
        }
    }

    /// Pointer released.
    #[must_use]
    pub const fn up(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Up,
            x,
            y,
            target: PointerTarget::Background,
        }
    }

    /// Client position as a point.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A wheel / trackpad scroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    /// X position in client pixels.
    pub x: f64,
    /// Y position in client pixels.
    pub y: f64,
    /// Vertical scroll amount (positive = down).
    pub delta_y: f64,
}

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled (e.g., palm rejection).
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in client pixels.
    pub x: f64,
    /// Y position in client pixels.
    pub y: f64,
}

/// A touch event with one or more touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    pub touches: Vec<TouchPoint>,
    /// What the touch started on.
    pub target: PointerTarget,
}

impl TouchEvent {
    /// Create a new touch event on the background.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self {
            phase,
            touches,
            target: PointerTarget::Background,
        }
    }

    /// Set the hit target.
    #[must_use]
    pub fn on(mut self, target: PointerTarget) -> Self {
        self.target = target;
        self
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}

/// Client-space bounding box of the canvas container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasRect {
    /// Left edge in client pixels.
    pub left: f64,
    /// Top edge in client pixels.
    pub top: f64,
    /// Width in client pixels.
    pub width: f64,
    /// Height in client pixels.
    pub height: f64,
}

impl CanvasRect {
    /// Create a rect.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether the container has a positive, finite size and origin.
    #[must_use]
    pub fn is_measurable(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Convert client coordinates to canvas-local screen coordinates.
    #[must_use]
    pub fn to_local(&self, client: Point) -> Point {
        Point::new(client.x - self.left, client.y - self.top)
    }

    /// Canvas-local centre point.
    #[must_use]
    pub fn local_center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_rect_is_not_measurable() {
        assert!(!CanvasRect::default().is_measurable());
        assert!(!CanvasRect::new(0.0, 0.0, 800.0, 0.0).is_measurable());
        assert!(!CanvasRect::new(f64::NAN, 0.0, 800.0, 600.0).is_measurable());
        assert!(CanvasRect::new(10.0, 20.0, 800.0, 600.0).is_measurable());
    }

    #[test]
    fn to_local_subtracts_origin() {
        let rect = CanvasRect::new(10.0, 20.0, 800.0, 600.0);
        assert_eq!(rect.to_local(Point::new(15.0, 25.0)), Point::new(5.0, 5.0));
        assert_eq!(rect.local_center(), Point::new(400.0, 300.0));
    }

    #[test]
    fn pointer_target_serializes_tagged() {
        let id = ElementId::new();
        let json = serde_json::to_string(&PointerTarget::Element(id)).expect("serialize");
        assert!(json.contains("\"type\":\"element\""));
        assert!(json.contains(&id.to_string()));
        let back: PointerTarget = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, PointerTarget::Element(id));
    }

    #[test]
    fn touch_helpers() {
        let touch = TouchEvent::new(
            TouchPhase::Start,
            vec![
                TouchPoint { id: 0, x: 1.0, y: 2.0 },
                TouchPoint { id: 1, x: 3.0, y: 4.0 },
            ],
        );
        assert!(touch.is_multi_touch());
        assert_eq!(touch.primary_touch().map(|t| t.id), Some(0));
    }
}
