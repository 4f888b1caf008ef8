//! # Seating Server
//!
//! Serves the REST layout API from a directory of JSON layouts.
//! Binds to localhost unless told otherwise.

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use seating_server::{router, AppState, ServerConfig};

/// Build a CORS layer that only allows localhost origins.
fn build_cors_layer(port: u16) -> CorsLayer {
    let localhost_origins = [
        format!("http://localhost:{port}"),
        format!("http://127.0.0.1:{port}"),
        // Frontend dev servers
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ];

    let origins: Vec<HeaderValue> = localhost_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,seating_server=debug,tower_http=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,seating_server=debug,tower_http=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown requested, draining connections"),
        Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {e}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = ServerConfig::parse();

    let state = AppState::open(&config.data_dir)
        .await
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;

    let app = router(state).layer(ServiceBuilder::new().layer(build_cors_layer(config.port)));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!("Seating server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
