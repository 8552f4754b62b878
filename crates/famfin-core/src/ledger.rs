//! In-memory working set of transactions
//!
//! The ledger owns its transactions and is the only place they are mutated.
//! Readers get borrowed slices or filtered views; category changes go through
//! [`Ledger::recategorize`].

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{MonthKey, Transaction};
use crate::reports::{self, Filter};
use crate::similar;

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// Replace the working set, as an import or demo load does
    pub fn replace(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn filter(&self, filter: &Filter) -> Vec<&Transaction> {
        filter.apply(&self.transactions)
    }

    pub fn months(&self) -> Vec<MonthKey> {
        reports::months(&self.transactions)
    }

    /// Change the category of one transaction, optionally with every similar one
    ///
    /// Returns the indices whose category changed (empty when nothing did).
    pub fn recategorize(
        &mut self,
        index: usize,
        category: &str,
        apply_similar: bool,
    ) -> Result<Vec<usize>> {
        let source = self
            .transactions
            .get(index)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("transaction #{}", index)))?;

        let targets = if apply_similar {
            similar::similar_indices(&self.transactions, &similar::group_key(&source))
        } else {
            vec![index]
        };

        let changed: Vec<usize> = targets
            .into_iter()
            .filter(|&i| self.transactions[i].category != category)
            .collect();
        for &i in &changed {
            self.transactions[i].category = category.to_string();
        }

        debug!(
            "Recategorized {} transaction(s) as '{}' (similar: {})",
            changed.len(),
            category,
            apply_similar
        );
        Ok(changed)
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }
}
