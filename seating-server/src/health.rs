//! Health check endpoints.
//!
//! - `/health/live` - the process is up
//! - `/health/ready` - the layout store answers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status: "healthy" or "unhealthy"
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
    /// Whether the layout store could be listed
    pub layout_store: bool,
}

/// Liveness probe.
#[tracing::instrument(name = "liveness_probe")]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe. Lists the stored layouts to prove the store is usable.
#[tracing::instrument(name = "readiness_probe", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let store_ok = match state.library().names().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Layout store not ready: {e}");
            false
        }
    };

    let status = HealthStatus {
        status: if store_ok { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        layout_store: store_ok,
    };
    let code = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus {
            status: "healthy",
            version: "0.2.0",
            layout_store: true,
        };
        let json = serde_json::to_string(&status).expect("should serialize");
        assert!(json.contains("healthy"));
        assert!(json.contains("layout_store"));
    }
}
