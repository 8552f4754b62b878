//! Transaction fingerprints for idempotent upserts
//!
//! The fingerprint is the SHA-256 (hex) of the pipe-joined immutable fields:
//! `date|description|amount|balance|currency|cardHolder`. Absent values
//! contribute an empty string. Numbers render in shortest form with negative
//! zero folded to `0`, matching what SQLite hands back. Category is not part
//! of the pre-image, so a re-categorized transaction updates its stored row.

use sha2::{Digest, Sha256};

use crate::models::Transaction;

/// Canonical pre-image for a transaction's fingerprint
pub fn fingerprint_payload(tx: &Transaction) -> String {
    let fields = [
        Some(tx.date.format("%Y-%m-%d").to_string()),
        Some(tx.description.clone()),
        Some(render_number(tx.amount)),
        tx.balance.map(render_number),
        Some(tx.currency.clone()),
        tx.card_holder.clone(),
    ];

    fields
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect::<Vec<_>>()
        .join("|")
}

fn render_number(value: f64) -> String {
    // -0.0 + 0.0 == +0.0
    (value + 0.0).to_string()
}

/// 64-char lowercase hex SHA-256 of [`fingerprint_payload`]
pub fn fingerprint(tx: &Transaction) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fingerprint_payload(tx).as_bytes());
    hex::encode(hasher.finalize())
}
