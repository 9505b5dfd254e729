//! shopmetrics - CLI tool to render workshop reports
//!
//! Runs the period-comparison report engine over the local store and
//! prints revenue, operations, customer, and inventory reports.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use shopmetrics_core::format::{format_delta, format_value};
use shopmetrics_core::reports::{
    CustomerReport, DateRange, InventoryReport, MetricSection, OperationsReport, RangePreset,
    ReportEngine, RevenueReport, SectionStatus,
};
use shopmetrics_core::{Config, Store};

#[derive(Parser)]
#[command(name = "shopmetrics")]
#[command(about = "Render workshop reports from the local store")]
#[command(version)]
struct Args {
    /// Report section: revenue, operations, customers, inventory, or all
    #[arg(short, long, default_value = "all")]
    section: String,

    /// Date-range preset (today, last-7-days, last-30-days, last-90-days,
    /// this-month, this-year); defaults to the configured preset
    #[arg(short, long)]
    preset: Option<String>,

    /// Custom range start (yyyy-mm-dd); requires --to
    #[arg(long)]
    from: Option<String>,

    /// Custom range end (yyyy-mm-dd); requires --from
    #[arg(long)]
    to: Option<String>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Verbose output (print the bucketed series, not just totals)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        shopmetrics_core::logging::init(&config.logging).context("failed to initialize logging")?;

    // Resolve the date range
    let range = resolve_range(&args, &config)?;

    // Open the store
    let db_path = Config::database_path();
    let store = Store::open(&db_path).context("failed to open store")?;
    store.migrate().context("failed to run store migrations")?;

    let counts = store.counts().context("failed to read store counts")?;
    if counts.total() == 0 {
        println!("No records in the local store.");
        println!("Run 'shopmetrics-sync' first to pull data from the backend.");
        return Ok(());
    }

    let engine = ReportEngine::new(store);
    let symbol = config.reporting.currency_symbol.as_str();

    match args.section.as_str() {
        "all" => {
            let report = engine.full_report(&range);
            if args.format == "json" {
                print_json(&report)?;
            } else {
                print_header(&range);
                print_revenue(&report.revenue, symbol, args.verbose);
                print_operations(&report.operations, symbol, args.verbose);
                print_customers(&report.customers, symbol, args.verbose);
                print_inventory(&report.inventory, symbol, args.verbose);
            }
        }
        "revenue" => {
            let report = engine.revenue_report(&range);
            if args.format == "json" {
                print_json(&report)?;
            } else {
                print_header(&range);
                print_revenue(&report, symbol, args.verbose);
            }
        }
        "operations" => {
            let report = engine.operations_report(&range);
            if args.format == "json" {
                print_json(&report)?;
            } else {
                print_header(&range);
                print_operations(&report, symbol, args.verbose);
            }
        }
        "customers" => {
            let report = engine.customer_report(&range);
            if args.format == "json" {
                print_json(&report)?;
            } else {
                print_header(&range);
                print_customers(&report, symbol, args.verbose);
            }
        }
        "inventory" => {
            let report = engine.inventory_report(&range);
            if args.format == "json" {
                print_json(&report)?;
            } else {
                print_header(&range);
                print_inventory(&report, symbol, args.verbose);
            }
        }
        other => anyhow::bail!(
            "unknown section '{}' (expected revenue, operations, customers, inventory, or all)",
            other
        ),
    }

    Ok(())
}

/// Build the report range from CLI args, falling back to the configured preset.
fn resolve_range(args: &Args, config: &Config) -> Result<DateRange> {
    match (&args.from, &args.to) {
        (Some(from), Some(to)) => {
            DateRange::parse(from, to).context("invalid --from/--to range")
        }
        (Some(_), None) | (None, Some(_)) => {
            anyhow::bail!("--from and --to must be given together")
        }
        (None, None) => {
            let name = args
                .preset
                .as_deref()
                .unwrap_or(&config.reporting.default_preset);
            let preset: RangePreset = name
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .with_context(|| format!("invalid preset '{}'", name))?;
            Ok(preset.to_range(Local::now().date_naive()))
        }
    }
}

fn print_json<T: serde::Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_header(range: &DateRange) {
    println!(
        "Period {} ({} days, {} buckets)\n",
        range,
        range.duration_days(),
        range.granularity().as_str()
    );
}

fn status_icon(status: SectionStatus) -> &'static str {
    match status {
        SectionStatus::Ok => "+",
        SectionStatus::Pending => "~",
        SectionStatus::Failed => "!",
    }
}

fn print_metric(section: &MetricSection, symbol: &str, verbose: bool) {
    let def = section.metric.def();
    println!(
        "  [{}] {}: {} ({} vs prior {})",
        status_icon(section.status),
        def.display_name,
        format_value(section.comparison.current, def.unit, symbol),
        format_delta(section.comparison.change_percent),
        format_value(section.comparison.prior, def.unit, symbol),
    );

    if verbose {
        for bucket in &section.series {
            println!(
                "      {:<12} {}",
                bucket.label,
                format_value(bucket.value, def.unit, symbol)
            );
        }
    }
}

fn print_revenue(report: &RevenueReport, symbol: &str, verbose: bool) {
    println!("Revenue");
    print_metric(&report.revenue, symbol, verbose);
    print_metric(&report.invoices, symbol, verbose);
    println!();
}

fn print_operations(report: &OperationsReport, symbol: &str, verbose: bool) {
    println!("Operations");
    print_metric(&report.bookings, symbol, verbose);
    print_metric(&report.jobs_completed, symbol, verbose);
    print_metric(&report.completion_days, symbol, verbose);
    println!();
}

fn print_customers(report: &CustomerReport, symbol: &str, verbose: bool) {
    println!("Customers");
    print_metric(&report.new_customers, symbol, verbose);

    let trend = &report.retention.trend;
    println!(
        "  [{}] Retention: {:.0}% ({} of {} retained, {} vs prior period)",
        status_icon(report.retention.status),
        trend.current.retention_percent,
        trend.current.retained_count,
        trend.current.base_count,
        format_delta(trend.comparison.change_percent),
    );
    println!();
}

fn print_inventory(report: &InventoryReport, symbol: &str, verbose: bool) {
    println!("Inventory");
    print_metric(&report.parts_consumed, symbol, verbose);
    println!();
}
