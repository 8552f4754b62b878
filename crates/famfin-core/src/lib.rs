//! FamFin Core Library
//!
//! Shared functionality for the FamFin family finance dashboard:
//! - Spreadsheet/CSV import into normalized transactions
//! - Keyword rule classification and similarity grouping
//! - Content fingerprints and the fingerprint-keyed upsert store
//! - In-memory working set (ledger) and dashboard reports
//! - Sync client and single-slot sync worker

pub mod classify;
pub mod config;
pub mod db;
pub mod demo;
pub mod error;
pub mod fingerprint;
pub mod import;
pub mod ledger;
pub mod models;
pub mod reports;
pub mod similar;
pub mod sync;

/// Test utilities including a mock sync server
#[cfg(test)]
pub mod test_utils;

pub use classify::{normalize_text, Classifier};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use import::{Cell, DateInput, ParseOutcome, Parser};
pub use ledger::Ledger;
pub use models::{MonthKey, StoredTransaction, Transaction, UpsertSummary};
pub use reports::{Filter, Summary};
pub use sync::{SyncClient, SyncFailure, SyncStatus, SyncWorker};
