//! Transaction command implementations

use anyhow::{Context, Result};
use famfin_core::db::Database;
use famfin_core::{Classifier, Config, Ledger, MonthKey, Transaction};
use tracing::warn;

use super::{format_amount, truncate};

pub fn cmd_transactions_list(db: &Database, month: Option<&str>, limit: usize) -> Result<()> {
    let month = parse_month_arg(month)?;
    let transactions = db.list_transactions(month)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  famfin import --file export.xlsx");
        return Ok(());
    }

    println!();
    match month {
        Some(m) => println!("📝 Transactions for {} ({} total)", m, transactions.len()),
        None => println!("📝 Recent Transactions ({} total)", transactions.len()),
    }
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.iter().take(limit) {
        let amount_str = if tx.amount < 0.0 {
            format!("\x1b[31m{:>12}\x1b[0m", format_amount(tx.amount)) // Red for expenses
        } else {
            format!("\x1b[32m{:>12}\x1b[0m", format_amount(tx.amount)) // Green for income
        };

        println!(
            "   {:>5} │ {} │ {} │ {:<32} │ {}",
            tx.id,
            tx.date,
            amount_str,
            truncate(&tx.description, 32),
            tx.category
        );
    }

    if transactions.len() > limit {
        println!("   ... and {} more (use --limit)", transactions.len() - limit);
    }

    Ok(())
}

pub fn cmd_recategorize(
    db: &Database,
    config: &Config,
    id: i64,
    category: &str,
    apply_similar: bool,
) -> Result<()> {
    let classifier = Classifier::new(&config.classifier);
    if !classifier.categories().iter().any(|c| c == category) {
        warn!("'{}' is not one of the configured categories", category);
    }

    let stored = db.list_transactions(None)?;
    let index = stored
        .iter()
        .position(|tx| tx.id == id)
        .with_context(|| format!("Transaction {} not found", id))?;

    let mut ledger = Ledger::from_transactions(stored.into_iter().map(Transaction::from).collect());
    let changed = ledger.recategorize(index, category, apply_similar)?;

    if changed.is_empty() {
        println!("Nothing to change: already categorized as '{}'", category);
        return Ok(());
    }

    let updated: Vec<Transaction> = changed
        .iter()
        .filter_map(|&i| ledger.get(i).cloned())
        .collect();
    db.upsert_transactions(&updated)
        .context("Failed to save categories")?;

    println!(
        "✅ Recategorized {} transaction(s) as '{}'",
        updated.len(),
        category
    );
    for tx in &updated {
        println!("   {} │ {}", tx.date, truncate(&tx.description, 40));
    }

    Ok(())
}

/// Parse an optional `YYYY-MM` argument
pub fn parse_month_arg(month: Option<&str>) -> Result<Option<MonthKey>> {
    month
        .map(|m| {
            m.trim()
                .parse::<MonthKey>()
                .with_context(|| format!("Invalid month '{}' (use YYYY-MM)", m))
        })
        .transpose()
}
