//! Dashboard report handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::transactions::parse_month;
use crate::{AppError, AppState};
use famfin_core::models::Transaction;
use famfin_core::reports::{self, Filter, Summary};

/// GET /api/categories - Known categories in display order
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.classifier.categories().to_vec())
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Month (YYYY-MM); defaults to the latest month with data
    pub month: Option<String>,
    /// Category name, or `all`
    pub category: Option<String>,
    pub search: Option<String>,
}

/// GET /api/summary - Totals, comparisons, insights and budgets for a filter
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<Summary>, AppError> {
    let requested = parse_month(params.month.as_deref())?;

    let transactions: Vec<Transaction> = state
        .db
        .list_transactions(None)?
        .into_iter()
        .map(Transaction::from)
        .collect();

    let month = requested.or_else(|| reports::latest_month(&transactions));
    let filter = Filter::new()
        .month(month)
        .category(params.category.as_deref())
        .search(params.search.as_deref());

    Ok(Json(reports::summarize(
        &transactions,
        &filter,
        &state.config.app,
    )))
}
