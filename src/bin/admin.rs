//! CLI administration tool for shortlink.
//!
//! Reads the record store configured for the server and prints statistics
//! or an owner's records without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # List records owned by a user
//! cargo run --bin admin -- urls u1
//!
//! # Check that the configured store answers
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_DSN`, `FILE_STORAGE_PATH`, `BASE_URL`.

use shortlink::config::{self, Config, mask_connection_string};
use shortlink::domain::repositories::RecordRepository;
use shortlink::infrastructure::persistence::connect_repository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;

/// CLI tool for inspecting a shortlink store.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Show statistics
    Stats,

    /// List the records of an owner
    Urls {
        /// Owner id as sent in the X-User-ID header
        owner: String,
    },

    /// Store operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Store diagnostic subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check that the configured store answers
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    let repository = connect_repository(&config)
        .await
        .context("Failed to open record store")?;

    match cli.command {
        Commands::Stats => handle_stats(repository).await?,
        Commands::Urls { owner } => handle_urls(repository, &config, &owner).await?,
        Commands::Db { action } => handle_db_action(action, repository, &config).await?,
    }

    Ok(())
}

/// Prints the number of stored URLs and distinct owners.
async fn handle_stats(repository: Arc<dyn RecordRepository>) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let stats = repository.stats().await?;

    println!("  URLs:   {}", stats.urls.to_string().bright_green().bold());
    println!("  Users:  {}", stats.users.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Lists an owner's records, marking deleted ones.
async fn handle_urls(
    repository: Arc<dyn RecordRepository>,
    config: &Config,
    owner: &str,
) -> Result<()> {
    let records = repository.list_by_owner(owner).await?;

    if records.is_empty() {
        println!("{}", format!("No records for '{owner}'").yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Records of '{owner}' ({})", records.len())
            .bright_blue()
            .bold()
    );
    println!();

    let base = config.base_url.trim_end_matches('/');
    for record in records {
        let short_url = format!("{}/{}", base, record.id);
        if record.is_deleted() {
            println!(
                "  {}  {}  {}",
                short_url.dimmed(),
                record.url.dimmed(),
                "deleted".red()
            );
        } else {
            println!("  {}  {}", short_url.bright_white(), record.url);
        }
    }
    println!();

    Ok(())
}

/// Handles store diagnostic commands.
async fn handle_db_action(
    action: DbAction,
    repository: Arc<dyn RecordRepository>,
    config: &Config,
) -> Result<()> {
    match action {
        DbAction::Check => {
            let target = match (&config.database_dsn, &config.file_storage_path) {
                (Some(dsn), _) => format!("database {}", mask_connection_string(dsn)),
                (None, Some(path)) => format!("file {path}"),
                (None, None) => "memory".to_string(),
            };

            println!("{}", format!("Checking {target}...").bright_blue());
            repository.stats().await?;
            println!("{}", "Record store OK".green().bold());
        }
    }

    Ok(())
}
