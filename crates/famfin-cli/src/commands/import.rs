//! Import command implementations

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Local;
use famfin_core::demo::demo_transactions;
use famfin_core::import::read_file;
use famfin_core::{Classifier, Config, Parser, SyncClient, SyncStatus, SyncWorker, Transaction};

use super::{format_amount, open_db, truncate};

pub async fn cmd_import(
    db_path: &Path,
    config: &Config,
    file: &Path,
    remote: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let rows = read_file(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let classifier = Classifier::new(&config.classifier);
    let outcome = Parser::new(&config.import, &classifier).parse_rows(&rows);

    println!("   Found {} transactions", outcome.transactions.len());
    if outcome.skipped_rows > 0 {
        println!("   Skipped (blank rows): {}", outcome.skipped_rows);
    }
    if outcome.degraded_dates > 0 {
        println!(
            "   ⚠️  {} rows had unreadable dates and were dated today",
            outcome.degraded_dates
        );
    }

    if outcome.transactions.is_empty() {
        println!("   Nothing to import");
        return Ok(());
    }

    if dry_run {
        print_transactions(&outcome.transactions);
        println!();
        println!("   Dry run: nothing stored");
        return Ok(());
    }

    match remote {
        Some(url) => push_remote(url, outcome.transactions).await,
        None => {
            let db = open_db(db_path)?;
            let summary = db
                .upsert_transactions(&outcome.transactions)
                .context("Failed to save transactions")?;

            println!("✅ Import complete!");
            println!("   New: {}", summary.inserted);
            println!("   Already stored: {}", summary.updated);
            Ok(())
        }
    }
}

async fn push_remote(url: &str, transactions: Vec<Transaction>) -> Result<()> {
    let client = SyncClient::new(url)?;
    if !client.health_check().await {
        bail!("Server at {} is not reachable", client.base_url());
    }

    println!("🔄 Syncing to {}...", client.base_url());
    let worker = SyncWorker::spawn(client);
    let status = worker.sync_now(transactions).await;
    worker.shutdown().await;

    match status {
        SyncStatus::Synced { summary, .. } => {
            println!("✅ Sync complete!");
            println!("   New: {}", summary.inserted);
            println!("   Already stored: {}", summary.updated);
            Ok(())
        }
        other => bail!("{}", other),
    }
}

pub fn cmd_demo(db_path: &Path, config: &Config, save: bool) -> Result<()> {
    let classifier = Classifier::new(&config.classifier);
    let transactions = demo_transactions(Local::now().date_naive(), &classifier);

    println!("🎲 Demo transactions");
    print_transactions(&transactions);

    if save {
        let db = open_db(db_path)?;
        let summary = db
            .upsert_transactions(&transactions)
            .context("Failed to save demo transactions")?;
        println!();
        println!(
            "✅ Saved {} demo transactions ({} new)",
            summary.saved, summary.inserted
        );
    }

    Ok(())
}

fn print_transactions(transactions: &[Transaction]) {
    println!();
    println!(
        "   {:<10}  {:<32}  {:>12}  {}",
        "Date", "Description", "Amount", "Category"
    );
    println!("   {}", "-".repeat(74));
    for tx in transactions {
        println!(
            "   {:<10}  {:<32}  {:>12}  {}",
            tx.date,
            truncate(&tx.description, 32),
            format_amount(tx.amount),
            tx.category
        );
    }
}
