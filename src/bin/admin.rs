//! CLI administration tool for snaplink.
//!
//! Talks to the database directly, so it works while the HTTP service is down.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL (returns the existing code if already shortened)
//! cargo run --bin admin -- shorten https://example.com/a
//!
//! # Stats for one code, or totals when no code is given
//! cargo run --bin admin -- stats abc123
//! cargo run --bin admin -- stats
//!
//! # Database tools
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db info
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! Reads the same database and engine settings as the service
//! (`DATABASE_URL` or `DB_*`, `CODE_LENGTH`, `SHORTEN_MAX_ATTEMPTS`).

use snaplink::application::services::{ShorteningService, StatsService};
use snaplink::config::{Config, mask_connection_string};
use snaplink::error::AppError;
use snaplink::infrastructure::persistence::PgUrlRepository;
use snaplink::utils::code_generator::RandomCodeGenerator;
use snaplink::utils::url_normalizer::canonicalize_target_url;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing snaplink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL
    Shorten {
        /// Absolute http(s) URL
        url: String,
    },

    /// Show statistics for a code, or totals
    Stats {
        /// Short code to inspect
        code: Option<String>,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to {}",
                mask_connection_string(&config.database_url)
            )
        })?;

    match cli.command {
        Commands::Shorten { url } => handle_shorten(&config, &pool, &url).await?,
        Commands::Stats { code: Some(code) } => handle_code_stats(&pool, &code).await?,
        Commands::Stats { code: None } => handle_totals(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn repository(pool: &PgPool) -> Arc<PgUrlRepository> {
    Arc::new(PgUrlRepository::new(Arc::new(pool.clone())))
}

/// Shortens a URL through the same service the HTTP endpoint uses.
async fn handle_shorten(config: &Config, pool: &PgPool, url: &str) -> Result<()> {
    let target_url = canonicalize_target_url(url)?;

    let service = ShorteningService::new(
        repository(pool),
        Arc::new(RandomCodeGenerator::new(config.code_length)),
        config.shorten_retry_policy(),
    );

    let record = service
        .shorten(&target_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten: {}", e))?;

    println!("{}", "🔗 Short link".bright_blue().bold());
    println!();
    println!("  Code:   {}", record.code.bright_green().bold());
    println!("  URL:    {}", record.target_url.cyan());
    println!("  Visits: {}", record.visits.to_string().bright_white());
    println!();

    Ok(())
}

/// Shows the record behind a code without counting a visit.
async fn handle_code_stats(pool: &PgPool, code: &str) -> Result<()> {
    let service = StatsService::new(repository(pool));

    let record = match service.get_stats(code).await {
        Ok(record) => record,
        Err(AppError::NotFound { .. }) => {
            println!("{} {}", "❌ No link with code".red(), code.yellow());
            return Ok(());
        }
        Err(e) => return Err(anyhow::anyhow!("Database error: {}", e)),
    };

    println!("{}", "📊 Link statistics".bright_blue().bold());
    println!();
    println!("  Code:    {}", record.code.bright_green().bold());
    println!("  URL:     {}", record.target_url.cyan());
    println!(
        "  Visits:  {}",
        record.visits.to_string().bright_green().bold()
    );
    println!(
        "  Created: {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

/// Displays totals across all links.
async fn handle_totals(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (links, visits): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(visits), 0)::BIGINT FROM urls")
            .fetch_one(pool)
            .await?;

    println!("  Links:  {}", links.to_string().bright_green().bold());
    println!("  Visits: {}", visits.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
        DbAction::Migrate => {
            println!("{}", "🛠  Applying migrations...".bright_blue());

            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to migrate")?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}
