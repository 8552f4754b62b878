//! Test utilities for famfin-core
//!
//! A mock bulk-sync server that records every batch it receives, used by the
//! sync client and worker tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

#[derive(Clone)]
struct MockState {
    received: Arc<Mutex<Vec<Vec<Value>>>>,
    status: StatusCode,
    delay: Duration,
}

/// Mock `/api/transactions/bulk` server
pub struct MockSyncServer {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Vec<Value>>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockSyncServer {
    /// Start a server that accepts every batch
    pub async fn start() -> Self {
        Self::start_with(StatusCode::OK, Duration::ZERO).await
    }

    /// Start a server that answers with `status` after `delay`
    pub async fn start_with(status: StatusCode, delay: Duration) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            received: received.clone(),
            status,
            delay,
        };

        let app = Router::new()
            .route("/api/health", get(|| async { Json(json!({ "status": "ok" })) }))
            .route("/api/transactions/bulk", post(handle_bulk))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Batches received so far, in arrival order
    pub fn received(&self) -> Vec<Vec<Value>> {
        self.received.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockSyncServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_bulk(State(state): State<MockState>, Json(batch): Json<Vec<Value>>) -> impl IntoResponse {
    state.received.lock().unwrap().push(batch.clone());
    tokio::time::sleep(state.delay).await;

    if state.status.is_success() {
        (
            state.status,
            Json(json!({ "saved": batch.len(), "inserted": batch.len(), "updated": 0 })),
        )
    } else if state.status == StatusCode::BAD_REQUEST {
        (state.status, Json(json!({ "error": "No transactions provided" })))
    } else {
        (state.status, Json(json!({ "error": "Failed to save transactions" })))
    }
}
