//! # Seating Core
//!
//! The interactive layout engine behind the seating planner: tables, chairs
//! and fixtures on a pannable, zoomable floor plan.
//! Compiles to WASM for the browser editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Editor                    │
//! ├─────────────────────────────────────────────┤
//! │  Scene           │  InteractionController   │
//! │  - Elements      │  - Pan / drag / click    │
//! │  - Selection     │  - Wheel zoom, touch     │
//! │  - Join          │  - Pointer capture       │
//! ├─────────────────────────────────────────────┤
//! │  Viewport        │  LayoutLibrary           │
//! │  - Zoom / pan    │  - LayoutRepository      │
//! │  - Screen↔model  │  - Memory / file stores  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! All geometry is stored in model coordinates. Screen coordinates only
//! exist at the input boundary and are converted through the [`Viewport`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod guests;
pub mod interaction;
pub mod join;
pub mod library;
pub mod persistence;
pub mod scene;
pub mod schema;
pub mod selection;
pub mod state;
pub mod viewport;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use editor::Editor;
pub use element::{Element, ElementId, ElementKind, ElementType, Transform};
pub use error::{CanvasError, CanvasResult};
pub use event::{
    CanvasRect, PointerEvent, PointerPhase, PointerTarget, TouchEvent, TouchPhase, TouchPoint,
    WheelEvent,
};
pub use guests::{seat_for_guest, suggest_guests};
pub use interaction::{
    Action, CaptureGuard, CaptureHost, GestureRejection, GestureState, InteractionConfig,
    InteractionController, NoopCapture, ZoomAnchor,
};
pub use join::{join_selected, merge_tables, JoinOutcome};
pub use library::{LayoutLibrary, SaveTicket};
#[cfg(not(target_arch = "wasm32"))]
pub use persistence::FileLayouts;
pub use persistence::{
    normalize_layout_name, LayoutRepository, MemoryLayouts, PersistenceError, PersistenceResult,
};
pub use scene::Scene;
pub use schema::{ElementDocument, LayoutDocument};
pub use selection::Selection;
pub use state::{EditorMode, SaveStatus};
pub use viewport::{Point, ScreenRect, SubscriptionId, ViewTransform, Viewport};

/// Seating core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
