//! shopmetrics-sync - CLI tool to sync workshop records into the local store
//!
//! Pulls customers, bookings, jobs, invoices, and inventory movements from
//! the hosted workshop backend (config-gated), or imports a JSON export
//! file for offline use.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/shopmetrics/data.db
//! - Logs: $XDG_STATE_HOME/shopmetrics/shopmetrics.log
//! - Config: $XDG_CONFIG_HOME/shopmetrics/config.toml

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use shopmetrics_core::remote::{self, BackendClient, SyncResult};
use shopmetrics_core::{Config, Store};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "shopmetrics-sync")]
#[command(about = "Sync workshop records into the local store")]
#[command(version)]
struct Args {
    /// Import a JSON export batch from disk instead of pulling from the backend
    #[arg(long)]
    from_file: Option<PathBuf>,

    /// Verbose output (show per-table errors)
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - check configuration but don't sync
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Ensure XDG environment variables are set before using core library
    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        shopmetrics_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("shopmetrics-sync starting");

    // Open store at XDG-compliant path
    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening store");

    let store = Store::open(&db_path).context("failed to open store")?;
    store.migrate().context("failed to run store migrations")?;

    println!("Store: {}", db_path.display());

    if args.dry_run {
        match &args.from_file {
            Some(path) => println!("Would import from {}", path.display()),
            None if config.backend.is_ready() => println!(
                "Would pull from {}",
                config.backend.base_url.as_deref().unwrap_or_default()
            ),
            None => println!("Backend not configured; nothing to sync"),
        }
        println!("\nDry run - no sync performed");
        tracing::info!("Dry run complete");
        return Ok(());
    }

    let result = if let Some(path) = &args.from_file {
        let pb = spinner(&format!("Importing {}", path.display()));
        let result = remote::import_file(path, &store).context("import failed")?;
        pb.finish_and_clear();
        result
    } else {
        if !config.backend.is_ready() {
            anyhow::bail!(
                "backend sync is not configured; enable [backend] in {} or pass --from-file",
                Config::config_path().display()
            );
        }

        let client = BackendClient::new(config.backend.clone())
            .context("failed to create backend client")?;

        let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

        if !runtime
            .block_on(client.health_check())
            .context("backend health check failed")?
        {
            anyhow::bail!("backend is reachable but unhealthy; try again later");
        }

        let pb = spinner("Pulling from backend");
        let result = runtime
            .block_on(remote::pull_all_with_progress(&client, &store, |table, count| {
                pb.set_message(format!("{}: {} records", table, count));
            }))
            .context("backend pull failed")?;
        pb.finish_and_clear();
        result
    };

    print_summary(&result, args.verbose);

    tracing::info!(
        records = result.total(),
        errors = result.errors.len(),
        "shopmetrics-sync complete"
    );

    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_summary(result: &SyncResult, verbose: bool) {
    println!("\nSync complete:");
    println!("  Customers:        {}", result.customers);
    println!("  Bookings:         {}", result.bookings);
    println!("  Jobs:             {}", result.jobs);
    println!("  Invoices:         {}", result.invoices);
    println!("  Inventory moves:  {}", result.inventory_moves);

    if !result.errors.is_empty() {
        println!("\nErrors ({}):", result.errors.len());
        if verbose {
            for error in &result.errors {
                println!("  {}", error);
            }
        } else {
            println!("  (run with --verbose to see details)");
        }
    }
}
