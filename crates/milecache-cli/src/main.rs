//! milecache - monthly distance totals for a Runkeeper user.
//!
//! Scrapes the user's public activity pages, caching them under the cache
//! directory so a second query on the same day stays offline.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use milecache_core::{Clock, Config, FileCache, MonthlyMiles, MonthlyMilesCalculator, SystemClock};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "milecache", version, about = "Total a Runkeeper user's miles for a month")]
struct Cli {
    /// Directory holding cached pages
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Site to scrape
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Delay before every network request, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    throttle_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Total miles for one user and month
    Miles {
        /// Runkeeper user identifier, as it appears in profile URLs
        user: String,
        year: i32,
        #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete cached activity lists from previous days
    Prune,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref dir) = self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(ref url) = self.base_url {
            config.base_url = url.clone();
        }
        if let Some(ms) = self.throttle_ms {
            config.throttle_ms = ms;
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Download notices are info; RUST_LOG=debug shows cache hits too
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stdout)
                .without_time()
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| chrono::Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("?")
}

fn summary(report: &MonthlyMiles) -> String {
    format!(
        "{}: {:.2} miles in {} {}",
        report.display_name(),
        report.total_miles,
        month_name(report.month),
        report.year
    )
}

async fn run_miles(config: &Config, user: &str, year: i32, month: u32, json: bool) -> Result<()> {
    let calculator = MonthlyMilesCalculator::new(config).context("Failed to set up scraper")?;
    let report = calculator
        .monthly_report(user, year, month)
        .await
        .with_context(|| format!("Failed to total miles for {} in {}-{:02}", user, year, month))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", summary(&report));
    }
    Ok(())
}

fn run_prune(config: &Config) -> Result<()> {
    let cache = FileCache::new(config.cache_dir.clone());
    let removed = cache
        .prune_stale_listings(SystemClock.today())
        .with_context(|| format!("Failed to prune {}", config.cache_dir.display()))?;
    println!("Removed {} stale activity list(s) from {}", removed, config.cache_dir.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::load().context("Failed to load configuration")?;
    cli.apply_to(&mut config);
    debug!(?config, "Resolved configuration");

    match cli.command {
        Command::Miles {
            ref user,
            year,
            month,
            json,
        } => run_miles(&config, user, year, month, json).await,
        Command::Prune => run_prune(&config),
    }
}
