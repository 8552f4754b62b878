//! Similarity grouping by normalized description
//!
//! Two transactions are "similar" when their normalized descriptions are
//! equal. No fuzzy matching: `ICA 123` and `ica` group together, `ICA Kvantum`
//! does not.

use std::collections::BTreeMap;

use crate::classify::normalize_text;
use crate::models::Transaction;

/// Group key for a transaction
pub fn group_key(tx: &Transaction) -> String {
    normalize_text(&tx.description)
}

/// Indices of all transactions sharing `key`
pub fn similar_indices(transactions: &[Transaction], key: &str) -> Vec<usize> {
    transactions
        .iter()
        .enumerate()
        .filter(|(_, tx)| group_key(tx) == key)
        .map(|(i, _)| i)
        .collect()
}

/// Set `category` on every transaction similar to `source`
///
/// Returns the number of transactions whose category changed.
pub fn apply_category_to_similar(
    transactions: &mut [Transaction],
    source: &Transaction,
    category: &str,
) -> usize {
    let key = group_key(source);
    let mut changed = 0;
    for tx in transactions.iter_mut() {
        if tx.category != category && group_key(tx) == key {
            tx.category = category.to_string();
            changed += 1;
        }
    }
    changed
}

/// Group transactions by key, keys in sorted order
pub fn groups(transactions: &[Transaction]) -> BTreeMap<String, Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, tx) in transactions.iter().enumerate() {
        groups.entry(group_key(tx)).or_default().push(i);
    }
    groups
}
