//! Error types for layout operations.

use thiserror::Error;

use crate::persistence::PersistenceError;
use crate::state::EditorMode;

/// Result type for layout operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in layout operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Element creation was requested without usable canvas bounds or with
    /// invalid geometry. No partial element is inserted.
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// The canvas container measured zero on at least one axis when a
    /// gesture started.
    #[error("Degenerate canvas geometry: {width}x{height}")]
    GeometryDegenerate {
        /// Measured container width.
        width: f64,
        /// Measured container height.
        height: f64,
    },

    /// Element not found in the store.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A guest assignment targeted an element that is not a chair.
    #[error("Element is not a seat: {0}")]
    NotASeat(String),

    /// The editor mode does not allow layout mutations.
    #[error("Layout is read-only in {0} mode")]
    ReadOnly(EditorMode),

    /// Layout serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persistence adapter failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}
