//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FamFin - Family finance dashboard
#[derive(Parser)]
#[command(name = "famfin")]
#[command(about = "Import, categorize and review family bank transactions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "famfin.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (classifier rules, import headers, budgets)
    ///
    /// Defaults to ~/.local/share/famfin/config/famfin.toml if present,
    /// otherwise the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import transactions from a bank export (xlsx, xls, ods or csv)
    Import {
        /// Spreadsheet or CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Push to a FamFin server instead of the local database
        #[arg(long)]
        remote: Option<String>,

        /// Parse and classify only; store nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show demo transactions for the current month
    Demo {
        /// Store the demo transactions in the database
        #[arg(long)]
        save: bool,
    },

    /// Dashboard summary: totals, comparisons, insights and budgets
    Summary {
        /// Month (YYYY-MM), defaults to the latest month with data
        #[arg(short, long)]
        month: Option<String>,

        /// Category filter ("all" for every category)
        #[arg(short, long)]
        category: Option<String>,

        /// Search text (matched against normalized descriptions)
        #[arg(short, long)]
        search: Option<String>,

        /// Override a budget, e.g. --budget "Mat & dagligvaror=5000"
        #[arg(long = "budget", value_name = "CATEGORY=AMOUNT")]
        budgets: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored transactions
    Transactions {
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,

        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Change the category of a stored transaction
    Recategorize {
        /// Transaction ID
        #[arg(long)]
        id: i64,

        /// New category
        #[arg(short, long)]
        category: String,

        /// Also apply to transactions with the same normalized description
        #[arg(long)]
        similar: bool,
    },

    /// List categories and classifier rules
    Categories,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "8080")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory with the dashboard's static files
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}
