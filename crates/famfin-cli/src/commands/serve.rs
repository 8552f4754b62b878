//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use famfin_core::Config;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    config: Config,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting FamFin web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    // Comma-separated list of extra CORS origins
    let allowed_origins: Vec<String> = std::env::var("FAMFIN_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !allowed_origins.is_empty() {
        println!(
            "   🌐 Allowed origins: {} (FAMFIN_ALLOWED_ORIGINS)",
            allowed_origins.join(", ")
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    let server_config = famfin_server::ServerConfig {
        allowed_origins,
        app: config,
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("Static dir path must be valid UTF-8"))
        .transpose()?;
    famfin_server::serve_with_config(db, host, port, static_dir_str, server_config).await?;

    Ok(())
}
