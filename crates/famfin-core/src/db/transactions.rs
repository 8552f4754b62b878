//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{MonthKey, StoredTransaction, Transaction, UpsertSummary};

const SELECT_COLUMNS: &str = "id, fingerprint, transaction_date, description, amount, balance, \
     category, currency, card_holder, created_at, updated_at";

impl Database {
    /// Insert or update a batch of transactions keyed by fingerprint
    ///
    /// New fingerprints are inserted with all fields. Existing ones only get
    /// `category`, `balance` and `updated_at` refreshed. The batch commits as a
    /// whole or not at all.
    pub fn upsert_transactions(&self, transactions: &[Transaction]) -> Result<UpsertSummary> {
        if transactions.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let count_rows = |tx: &rusqlite::Transaction| -> rusqlite::Result<i64> {
            tx.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
        };
        let before = count_rows(&tx)?;

        {
            let mut stmt = tx.prepare_cached(
                r#"
                INSERT INTO transactions (
                    fingerprint, transaction_date, description, amount,
                    balance, category, currency, card_holder
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (fingerprint) DO UPDATE SET
                    category = excluded.category,
                    balance = excluded.balance,
                    updated_at = CURRENT_TIMESTAMP
                "#,
            )?;

            for transaction in transactions {
                stmt.execute(params![
                    transaction.fingerprint(),
                    transaction.date.to_string(),
                    transaction.description,
                    transaction.amount,
                    transaction.balance,
                    transaction.category,
                    transaction.currency,
                    transaction.card_holder,
                ])?;
            }
        }

        let after = count_rows(&tx)?;
        tx.commit()?;

        let inserted = (after - before).max(0) as usize;
        let summary = UpsertSummary {
            saved: transactions.len(),
            inserted,
            updated: transactions.len().saturating_sub(inserted),
        };

        info!(
            "Saved {} transactions ({} new, {} updated)",
            summary.saved, summary.inserted, summary.updated
        );
        Ok(summary)
    }

    /// Persisted transactions, optionally limited to one month, newest first
    pub fn list_transactions(&self, month: Option<MonthKey>) -> Result<Vec<StoredTransaction>> {
        let conn = self.conn()?;

        let transactions = match month {
            Some(month) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM transactions
                     WHERE transaction_date >= ? AND transaction_date < ?
                     ORDER BY transaction_date DESC, id DESC",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(
                    params![
                        month.first_day().to_string(),
                        month.next().first_day().to_string()
                    ],
                    Self::row_to_stored_transaction,
                )?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM transactions ORDER BY transaction_date DESC, id DESC",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map([], Self::row_to_stored_transaction)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        Ok(transactions)
    }

    /// Get a persisted transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<StoredTransaction>> {
        let conn = self.conn()?;
        let transaction = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", SELECT_COLUMNS),
                params![id],
                Self::row_to_stored_transaction,
            )
            .optional()?;
        Ok(transaction)
    }

    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_stored_transaction(row: &rusqlite::Row) -> rusqlite::Result<StoredTransaction> {
        let date_str: String = row.get(2)?;
        let created_at_str: String = row.get(9)?;
        let updated_at_str: String = row.get(10)?;

        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(StoredTransaction {
            id: row.get(0)?,
            fingerprint: row.get(1)?,
            date,
            description: row.get(3)?,
            amount: row.get(4)?,
            balance: row.get(5)?,
            category: row.get(6)?,
            currency: row.get(7)?,
            card_holder: row.get(8)?,
            created_at: parse_datetime(&created_at_str),
            updated_at: parse_datetime(&updated_at_str),
        })
    }
}
