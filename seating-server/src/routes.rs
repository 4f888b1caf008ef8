//! Layout API route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use seating_core::{normalize_layout_name, LayoutDocument};

use crate::error::ApiError;
use crate::validation::{parse_seat_id, validate_element_count, validate_guest_name};
use crate::AppState;

/// Response to a successful save.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveLayoutResponse {
    /// "Layout saved" for a new layout, "Layout updated" for a replacement.
    pub message: String,
    /// Normalized layout name.
    pub name: String,
}

/// Body of a seat assignment.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignSeatRequest {
    /// Chair element id.
    pub seat_id: String,
    /// Guest to seat; empty clears the seat.
    #[serde(default)]
    pub guest_name: String,
}

/// Generic acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// What happened.
    pub message: String,
}

/// `GET /api/layouts`
#[tracing::instrument(name = "list_layouts", skip(state))]
pub async fn list_layouts(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.library().names().await?))
}

/// `GET /api/layouts/{name}`
#[tracing::instrument(name = "get_layout", skip(state))]
pub async fn get_layout(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<LayoutDocument>, ApiError> {
    let name = normalize_layout_name(&name)?;
    let elements = state.library().load(&name).await?;
    Ok(Json(LayoutDocument::from_elements(name, &elements)))
}

/// `POST /api/layouts`
///
/// Inserts or replaces. Every element is validated before anything is
/// written.
#[tracing::instrument(name = "save_layout", skip(state, payload))]
pub async fn save_layout(
    State(state): State<AppState>,
    payload: Result<Json<LayoutDocument>, JsonRejection>,
) -> Result<Json<SaveLayoutResponse>, ApiError> {
    let Json(doc) = payload.map_err(|e| ApiError::InvalidLayout(e.body_text()))?;
    let name = normalize_layout_name(&doc.name)?;
    validate_element_count(doc.elements.len())?;
    let elements = doc
        .into_elements()
        .map_err(|e| ApiError::InvalidLayout(e.to_string()))?;

    let existed = state.library().names().await?.contains(&name);
    state.library().save(&name, &elements).await?;

    let message = if existed {
        "Layout updated"
    } else {
        "Layout saved"
    };
    Ok(Json(SaveLayoutResponse {
        message: message.to_string(),
        name,
    }))
}

/// `DELETE /api/layouts/{name}`
#[tracing::instrument(name = "delete_layout", skip(state))]
pub async fn delete_layout(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.library().delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/layouts/{name}/assign-seat`
#[tracing::instrument(name = "assign_seat", skip(state, payload))]
pub async fn assign_seat(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<AssignSeatRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let seat = parse_seat_id(&request.seat_id)?;
    let guest = request.guest_name.trim();
    validate_guest_name(guest)?;
    state.library().assign_guest(&name, seat, guest).await?;

    let message = if guest.is_empty() {
        "Seat cleared"
    } else {
        "Seat assigned"
    };
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}
