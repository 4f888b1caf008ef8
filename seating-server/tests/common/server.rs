//! Test server harness for integration tests.
//!
//! Spins up the real router on a random port, backed by a temporary data
//! directory.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use seating_server::{router, AppState};

/// A test server instance with control handles.
pub struct TestServer {
    addr: SocketAddr,
    data_dir: tempfile::TempDir,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server on a random available port.
    ///
    /// # Panics
    ///
    /// Panics if no port is available or server fails to bind.
    pub async fn start() -> Self {
        let port = portpicker::pick_unused_port().expect("no available port");
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let data_dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::open(data_dir.path()).await.expect("state");
        let app = router(state);

        let listener = TcpListener::bind(addr).await.expect("failed to bind");
        let actual_addr = listener.local_addr().expect("failed to get local addr");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("server error");
        });

        Self {
            addr: actual_addr,
            data_dir,
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    /// The API root URL.
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// The directory layouts are written to.
    #[allow(dead_code)]
    pub fn data_dir(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    /// Shut down the server and wait for it to stop.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}
