//! Pushing the working set to a FamFin server
//!
//! [`SyncClient`] performs one bulk upsert over HTTP. [`SyncWorker`] runs the
//! client in a background task behind a single-slot queue: a new request
//! replaces any request still waiting, a request already in flight runs to
//! completion, and progress is published as [`SyncStatus`] on a watch channel.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{Transaction, UpsertSummary};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body returned by the server
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP client for the bulk upsert endpoint
#[derive(Clone)]
pub struct SyncClient {
    http_client: Client,
    base_url: String,
}

impl SyncClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the server answers its health endpoint
    pub async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Upsert a batch on the server
    ///
    /// An empty batch is rejected locally without a request. A 400 from the
    /// server maps to [`Error::EmptyBatch`] or [`Error::InvalidData`]; any other
    /// failure is a retryable [`Error::Sync`].
    pub async fn push(&self, transactions: &[Transaction]) -> Result<UpsertSummary> {
        if transactions.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let response = self
            .http_client
            .post(format!("{}/api/transactions/bulk", self.base_url))
            .json(transactions)
            .send()
            .await
            .map_err(|e| Error::Sync(format!("Server unreachable: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            let summary: UpsertSummary = response.json().await?;
            debug!("Server saved {} transactions", summary.saved);
            return Ok(summary);
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| status.to_string());

        match status {
            StatusCode::BAD_REQUEST if message == Error::EmptyBatch.to_string() => {
                Err(Error::EmptyBatch)
            }
            StatusCode::BAD_REQUEST => Err(Error::InvalidData(message)),
            _ => Err(Error::Sync(format!("{} ({})", message, status))),
        }
    }
}

/// Why the last sync did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    /// The working set was empty; nothing was sent
    NothingToSync,
    /// The server refused the payload
    Rejected(String),
    /// Network or storage failure; retrying may succeed
    Failed(String),
}

impl From<&Error> for SyncFailure {
    fn from(err: &Error) -> Self {
        match err {
            Error::EmptyBatch => Self::NothingToSync,
            Error::InvalidData(msg) => Self::Rejected(msg.clone()),
            other => Self::Failed(other.to_string()),
        }
    }
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToSync => write!(f, "nothing to sync"),
            Self::Rejected(msg) => write!(f, "rejected: {}", msg),
            Self::Failed(msg) => write!(f, "failed: {}", msg),
        }
    }
}

/// Sync state: `Idle → Syncing → {Synced, Error}`, re-enterable from either end state
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Synced {
        at: DateTime<Utc>,
        summary: UpsertSummary,
    },
    Error(SyncFailure),
}

impl SyncStatus {
    /// Whether no sync is running
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Syncing)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Syncing => write!(f, "syncing"),
            Self::Synced { at, summary } => write!(
                f,
                "synced {} transactions at {}",
                summary.saved,
                at.format("%Y-%m-%d %H:%M:%S")
            ),
            Self::Error(failure) => write!(f, "sync error: {}", failure),
        }
    }
}

/// Background sync task with a single-slot request queue
pub struct SyncWorker {
    request_tx: watch::Sender<Option<Vec<Transaction>>>,
    status_rx: watch::Receiver<SyncStatus>,
    handle: JoinHandle<()>,
}

impl SyncWorker {
    /// Spawn the worker on the current tokio runtime
    pub fn spawn(client: SyncClient) -> Self {
        let (request_tx, mut request_rx) = watch::channel::<Option<Vec<Transaction>>>(None);
        let (status_tx, status_rx) = watch::channel(SyncStatus::Idle);

        let handle = tokio::spawn(async move {
            while request_rx.changed().await.is_ok() {
                // Take the latest request; anything queued before it is superseded
                let request = request_rx.borrow_and_update().clone();
                let Some(batch) = request else {
                    continue;
                };

                if batch.is_empty() {
                    status_tx.send_replace(SyncStatus::Error(SyncFailure::NothingToSync));
                    continue;
                }

                status_tx.send_replace(SyncStatus::Syncing);
                let status = match client.push(&batch).await {
                    Ok(summary) => {
                        info!("Synced {} transactions to {}", summary.saved, client.base_url());
                        SyncStatus::Synced {
                            at: Utc::now(),
                            summary,
                        }
                    }
                    Err(e) => {
                        warn!("Sync failed: {}", e);
                        SyncStatus::Error(SyncFailure::from(&e))
                    }
                };
                status_tx.send_replace(status);
            }
            debug!("Sync worker stopped");
        });

        Self {
            request_tx,
            status_rx,
            handle,
        }
    }

    /// Queue a sync of `transactions`, replacing any request not yet started
    pub fn request(&self, transactions: Vec<Transaction>) {
        self.request_tx.send_replace(Some(transactions));
    }

    /// Current status
    pub fn status(&self) -> SyncStatus {
        self.status_rx.borrow().clone()
    }

    /// Receiver for status changes
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }

    /// Request a sync and wait until it (or a request that replaced it) settles
    pub async fn sync_now(&self, transactions: Vec<Transaction>) -> SyncStatus {
        let mut status_rx = self.subscribe();
        status_rx.mark_unchanged();
        self.request(transactions);

        loop {
            if status_rx.changed().await.is_err() {
                return self.status();
            }
            let status = status_rx.borrow_and_update().clone();
            if status.is_settled() {
                return status;
            }
        }
    }

    /// Stop accepting requests and wait for the in-flight one to finish
    pub async fn shutdown(self) {
        let Self {
            request_tx, handle, ..
        } = self;
        drop(request_tx);
        if let Err(e) = handle.await {
            warn!("Sync worker task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockSyncServer;
    use chrono::NaiveDate;

    fn tx(description: &str, amount: f64) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            description: description.to_string(),
            amount,
            balance: Some(1200.0),
            category: "Övrigt".to_string(),
            currency: "SEK".to_string(),
            card_holder: None,
        }
    }

    #[tokio::test]
    async fn test_push_sends_wire_format() {
        let server = MockSyncServer::start().await;
        let client = SyncClient::new(&server.url()).unwrap();

        let summary = client.push(&[tx("ICA Kvantum", -185.5)]).await.unwrap();
        assert_eq!(summary.saved, 1);

        let received = server.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0][0]["date"], "2024-03-05");
        assert_eq!(received[0][0]["description"], "ICA Kvantum");
        assert!(received[0][0].get("cardHolder").is_some());
    }

    #[tokio::test]
    async fn test_push_empty_batch_sends_nothing() {
        let server = MockSyncServer::start().await;
        let client = SyncClient::new(&server.url()).unwrap();

        assert!(matches!(client.push(&[]).await, Err(Error::EmptyBatch)));
        assert!(server.received().is_empty());
    }

    #[tokio::test]
    async fn test_push_maps_server_errors() {
        let server = MockSyncServer::start_with(StatusCode::BAD_REQUEST, Duration::ZERO).await;
        let client = SyncClient::new(&server.url()).unwrap();
        assert!(matches!(
            client.push(&[tx("a", 1.0)]).await,
            Err(Error::EmptyBatch)
        ));

        let server =
            MockSyncServer::start_with(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
        let client = SyncClient::new(&server.url()).unwrap();
        let err = client.push(&[tx("a", 1.0)]).await.unwrap_err();
        assert!(matches!(err, Error::Sync(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_push_unreachable_server_is_retryable() {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SyncClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.push(&[tx("a", 1.0)]).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockSyncServer::start().await;
        let client = SyncClient::new(&format!("{}/", server.url())).unwrap();
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_worker_status_transitions() {
        let server = MockSyncServer::start().await;
        let worker = SyncWorker::spawn(SyncClient::new(&server.url()).unwrap());
        assert_eq!(worker.status(), SyncStatus::Idle);

        let status = worker.sync_now(vec![tx("Hyra", -12500.0)]).await;
        match status {
            SyncStatus::Synced { summary, .. } => assert_eq!(summary.saved, 1),
            other => panic!("expected synced, got {:?}", other),
        }

        // Re-enterable: an empty working set errors without a request
        let status = worker.sync_now(Vec::new()).await;
        assert_eq!(status, SyncStatus::Error(SyncFailure::NothingToSync));
        assert_eq!(server.received().len(), 1);

        worker.shutdown().await;
    }

    #[tokio::test]
    async fn test_worker_reports_failure() {
        let server =
            MockSyncServer::start_with(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
        let worker = SyncWorker::spawn(SyncClient::new(&server.url()).unwrap());

        let status = worker.sync_now(vec![tx("Hyra", -12500.0)]).await;
        assert!(matches!(status, SyncStatus::Error(SyncFailure::Failed(_))));

        worker.shutdown().await;
    }

    #[tokio::test]
    async fn test_latest_request_supersedes_pending() {
        let server = MockSyncServer::start_with(StatusCode::OK, Duration::from_millis(200)).await;
        let worker = SyncWorker::spawn(SyncClient::new(&server.url()).unwrap());
        let mut status_rx = worker.subscribe();

        worker.request(vec![tx("first", -1.0)]);
        status_rx
            .wait_for(|s| *s == SyncStatus::Syncing)
            .await
            .unwrap();

        // Both queued while "first" is in flight; only the latest is sent
        worker.request(vec![tx("second", -2.0)]);
        worker.request(vec![tx("third", -3.0)]);

        status_rx
            .wait_for(|s| matches!(s, SyncStatus::Synced { .. }))
            .await
            .unwrap();
        worker.shutdown().await;

        let received = server.received();
        let descriptions: Vec<&str> = received
            .iter()
            .map(|batch| batch[0]["description"].as_str().unwrap())
            .collect();
        assert_eq!(descriptions, vec!["first", "third"]);
    }
}
