//! FamFin CLI - Family finance dashboard
//!
//! Usage:
//!   famfin init                     Initialize database
//!   famfin import --file export.xlsx  Import a bank export (xlsx, xls, ods, csv)
//!   famfin summary --month 2024-03  Dashboard totals, insights and budgets
//!   famfin serve --port 8080        Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Import {
            file,
            remote,
            dry_run,
        } => commands::cmd_import(&cli.db, &config, &file, remote.as_deref(), dry_run).await,
        Commands::Demo { save } => commands::cmd_demo(&cli.db, &config, save),
        Commands::Summary {
            month,
            category,
            search,
            budgets,
            json,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_summary(
                &db,
                &config,
                month.as_deref(),
                category.as_deref(),
                search.as_deref(),
                &budgets,
                json,
            )
        }
        Commands::Transactions { month, limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_transactions_list(&db, month.as_deref(), limit)
        }
        Commands::Recategorize {
            id,
            category,
            similar,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_recategorize(&db, &config, id, &category, similar)
        }
        Commands::Categories => commands::cmd_categories(&config),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&cli.db, config, &host, port, static_dir.as_deref()).await,
    }
}
