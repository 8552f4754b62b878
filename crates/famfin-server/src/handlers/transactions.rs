//! Transaction handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{AppError, AppState};
use famfin_core::models::{MonthKey, StoredTransaction, Transaction, UpsertSummary};
use famfin_core::Error;

/// Transaction as sent by dashboard clients
///
/// `category` and `currency` are optional; the server fills them in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub card_holder: Option<String>,
}

impl WireTransaction {
    fn into_transaction(self, state: &AppState) -> Transaction {
        let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());

        let category = non_empty(self.category)
            .unwrap_or_else(|| state.classifier.classify(&self.description, self.amount).to_string());
        let currency = non_empty(self.currency)
            .unwrap_or_else(|| state.config.app.import.default_currency.clone());

        Transaction {
            date: self.date,
            description: self.description,
            amount: self.amount,
            balance: self.balance,
            category,
            currency,
            card_holder: non_empty(self.card_holder),
        }
    }
}

/// POST /api/transactions/bulk - Upsert a batch keyed by fingerprint
///
/// The body is a JSON array of transactions. Anything else, or an empty
/// array, is rejected with 400 before touching storage.
pub async fn bulk_upsert(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<UpsertSummary>, AppError> {
    let no_transactions = || AppError::bad_request(&Error::EmptyBatch.to_string());

    let payload: Value = serde_json::from_slice(&body).map_err(|_| no_transactions())?;
    let Value::Array(items) = payload else {
        return Err(no_transactions());
    };
    if items.is_empty() {
        return Err(no_transactions());
    }

    let mut transactions = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let wire: WireTransaction = serde_json::from_value(item).map_err(|e| {
            debug!("Rejected bulk element {}: {}", index, e);
            AppError::bad_request(&format!("Invalid transaction at index {}: {}", index, e))
        })?;
        transactions.push(wire.into_transaction(&state));
    }

    let db = state.db.clone();
    let summary = tokio::task::spawn_blocking(move || db.upsert_transactions(&transactions))
        .await
        .map_err(|e| AppError::internal("Failed to save transactions", e))?
        .map_err(|e| {
            warn!("Bulk upsert rolled back: {}", e);
            AppError::internal("Failed to save transactions", e)
        })?;

    Ok(Json(summary))
}

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    /// Month selector (YYYY-MM)
    pub month: Option<String>,
}

/// Parse an optional `YYYY-MM` query value; empty means "all"
pub(crate) fn parse_month(month: Option<&str>) -> Result<Option<MonthKey>, AppError> {
    match month.map(str::trim).filter(|m| !m.is_empty()) {
        Some(m) => m
            .parse::<MonthKey>()
            .map(Some)
            .map_err(|e| AppError::bad_request(&e.to_string())),
        None => Ok(None),
    }
}

/// GET /api/transactions - Persisted transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<Vec<StoredTransaction>>, AppError> {
    let month = parse_month(params.month.as_deref())?;

    let transactions = state
        .db
        .list_transactions(month)
        .map_err(|e| AppError::internal("Failed to fetch transactions", e))?;

    Ok(Json(transactions))
}
