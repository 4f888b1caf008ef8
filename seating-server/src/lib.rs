//! # Seating Server Library
//!
//! REST layout API shared by the `seating-server` binary and its
//! integration tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use seating_core::{FileLayouts, LayoutLibrary, LayoutRepository, PersistenceResult};

pub mod config;
pub mod error;
pub mod health;
pub mod routes;
pub mod validation;

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    library: LayoutLibrary<dyn LayoutRepository>,
}

impl AppState {
    /// Serve layouts from any repository.
    pub fn new(repository: Arc<dyn LayoutRepository>) -> Self {
        Self {
            library: LayoutLibrary::new(repository),
        }
    }

    /// Serve layouts from a data directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub async fn open(data_dir: impl Into<PathBuf>) -> PersistenceResult<Self> {
        let files = FileLayouts::open(data_dir).await?;
        Ok(Self::new(Arc::new(files)))
    }

    /// The layout library behind the API.
    pub fn library(&self) -> &LayoutLibrary<dyn LayoutRepository> {
        &self.library
    }
}

/// Build the API router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route(
            "/api/layouts",
            get(routes::list_layouts).post(routes::save_layout),
        )
        .route(
            "/api/layouts/{name}",
            get(routes::get_layout).delete(routes::delete_layout),
        )
        .route("/api/layouts/{name}/assign-seat", post(routes::assign_seat))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
