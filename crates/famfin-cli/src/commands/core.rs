//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Shared utility to load classifier/import/budget config
//! - `cmd_init` - Initialize the database
//! - `cmd_categories` - List categories and classifier rules

use std::path::Path;

use anyhow::{Context, Result};
use famfin_core::{Classifier, Config, Database};

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load config")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let count = db
        .count_transactions()
        .context("Failed to read transactions")?;
    println!("   {} transactions stored", count);

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: famfin import --file export.xlsx");
    println!("  2. Review the month: famfin summary");
    println!("  3. Start web UI: famfin serve");

    Ok(())
}

pub fn cmd_categories(config: &Config) -> Result<()> {
    let classifier = Classifier::new(&config.classifier);

    println!("📂 Categories");
    for category in classifier.categories() {
        match config.budget_for(category) {
            Some(budget) => println!("   {:<24} budget {}", category, super::format_amount(budget)),
            None => println!("   {}", category),
        }
    }

    println!();
    println!("🔎 Rules (first match wins)");
    for rule in classifier.rules() {
        println!("   {:<16} → {}", rule.keyword, rule.category);
    }
    println!(
        "   (no match)       → {} if amount > 0, else {}",
        classifier.income_category(),
        classifier.fallback_category()
    );

    Ok(())
}
