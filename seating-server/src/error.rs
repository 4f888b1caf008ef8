//! Mapping of failures to HTTP responses.
//!
//! Every error body is `{ "error": "<message>", "kind": "<machine tag>" }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use seating_core::PersistenceError;

use crate::validation::ValidationError;

/// Errors returned by the layout API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The repository rejected or failed the request.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// Request data failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The request body is not a usable layout.
    #[error("Invalid layout data: {0}")]
    InvalidLayout(String),
    /// The request body could not be read.
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Stable machine-readable tag.
    pub kind: &'static str,
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Persistence(
                PersistenceError::LayoutNotFound(_) | PersistenceError::SeatNotFound(_),
            ) => StatusCode::NOT_FOUND,
            Self::Persistence(PersistenceError::InvalidName(_))
            | Self::Validation(_)
            | Self::InvalidLayout(_)
            | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Persistence(PersistenceError::SaveInProgress(_)) => StatusCode::CONFLICT,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable tag for this error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Persistence(e) => match e {
                PersistenceError::LayoutNotFound(_) => "layout_not_found",
                PersistenceError::SeatNotFound(_) => "seat_not_found",
                PersistenceError::InvalidName(_) => "invalid_name",
                PersistenceError::SaveInProgress(_) => "save_in_progress",
                PersistenceError::Serialization(_) => "corrupt_layout",
                PersistenceError::Io(_) | PersistenceError::Backend(_) => "internal",
            },
            Self::Validation(ValidationError::InvalidSeatId(_)) => "invalid_seat",
            Self::Validation(ValidationError::TooManyElements) => "too_many_elements",
            Self::Validation(_) => "invalid_guest",
            Self::InvalidLayout(_) => "invalid_layout",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::debug!("Request rejected ({status}): {self}");
        }
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_persistence_errors_to_statuses() {
        let cases = [
            (PersistenceError::LayoutNotFound("x".into()), StatusCode::NOT_FOUND),
            (PersistenceError::SeatNotFound("x".into()), StatusCode::NOT_FOUND),
            (PersistenceError::InvalidName(" ".into()), StatusCode::BAD_REQUEST),
            (PersistenceError::SaveInProgress("x".into()), StatusCode::CONFLICT),
            (PersistenceError::Backend("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let error = ApiError::from(ValidationError::InvalidSeatId("42".into()));
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.kind(), "invalid_seat");
    }
}
