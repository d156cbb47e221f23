use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Cell, Table};
use configuration::Config;
use core_types::{Holding, PortfolioSnapshot, Quote, SortDirection, SortKey};
use engine::{CycleOutput, Engine};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Meridian analytics application.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Snapshot(args) => {
            if let Err(e) = handle_snapshot(args) {
                eprintln!("Error computing snapshot: {e:#}");
            }
        }
        Commands::Watch(args) => {
            if let Err(e) = handle_watch(args).await {
                eprintln!("Error during watch: {e:#}");
            }
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Portfolio valuation and analytics for a paper-trading dashboard.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one portfolio snapshot from holdings and a quote batch.
    Snapshot(SnapshotArgs),
    /// Recompute on a fixed interval, re-reading the input files each tick.
    Watch(WatchArgs),
}

#[derive(Parser)]
struct SnapshotArgs {
    /// Path to the holdings JSON file (positions, cash, backend NAV).
    #[arg(long)]
    holdings: PathBuf,

    /// Path to the quote batch JSON file.
    #[arg(long)]
    quotes: PathBuf,

    /// Path to a previously computed snapshot, used as the delta baseline.
    #[arg(long)]
    previous: Option<PathBuf>,

    /// Path to config.toml; defaults apply when the file is absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sort key for the positions table.
    #[arg(long, value_enum, default_value = "weight")]
    sort: SortArg,

    /// Sort direction; each key has a natural default when omitted.
    #[arg(long, value_enum)]
    direction: Option<DirectionArg>,

    /// Emit the full cycle output as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct WatchArgs {
    /// Path to the holdings JSON file, re-read on every tick.
    #[arg(long)]
    holdings: PathBuf,

    /// Path to the quote batch JSON file, re-read on every tick.
    #[arg(long)]
    quotes: PathBuf,

    /// Path to config.toml; defaults apply when the file is absent.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Alphabetic,
    Gain,
    Weight,
}

impl SortArg {
    fn key(self) -> SortKey {
        match self {
            SortArg::Alphabetic => SortKey::Alphabetic,
            SortArg::Gain => SortKey::GainLossPercent,
            SortArg::Weight => SortKey::Weight,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Asc,
    Desc,
}

impl DirectionArg {
    fn direction(self) -> SortDirection {
        match self {
            DirectionArg::Asc => SortDirection::Asc,
            DirectionArg::Desc => SortDirection::Desc,
        }
    }
}

// ==============================================================================
// Input Files
// ==============================================================================

/// The holdings payload as the dashboard backend supplies it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoldingsFile {
    holdings: Vec<Holding>,
    cash: Decimal,
    /// The backend's own authoritative NAV, used as a cross-check.
    #[serde(default)]
    total_value: Option<Decimal>,
}

fn read_holdings(path: &Path) -> anyhow::Result<HoldingsFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading holdings file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing holdings file {}", path.display()))
}

fn read_quotes(path: &Path) -> anyhow::Result<Vec<Quote>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading quotes file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing quotes file {}", path.display()))
}

fn read_previous(path: &Path) -> anyhow::Result<PortfolioSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading previous snapshot {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing previous snapshot {}", path.display()))
}

fn load_configuration(explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => Ok(configuration::load_config_from(path)?),
        None if Path::new("config.toml").exists() => Ok(configuration::load_config()?),
        None => Ok(Config::default()),
    }
}

/// Flags a recomputed NAV that disagrees with the backend's own figure.
/// The recomputation still wins for display; the mismatch is only logged.
fn cross_check_nav(recomputed: Decimal, backend: Option<Decimal>) {
    const TOLERANCE: Decimal = Decimal::ONE;
    if let Some(backend) = backend {
        if (recomputed - backend).abs() > TOLERANCE {
            warn!(%recomputed, %backend, "recomputed NAV disagrees with backend total");
        }
    }
}

// ==============================================================================
// Snapshot Command Logic
// ==============================================================================

fn handle_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let config = load_configuration(args.config.as_deref())?;
    let mut engine = Engine::new(config)?;

    let holdings_file = read_holdings(&args.holdings)?;
    let quotes = read_quotes(&args.quotes)?;
    let previous = args.previous.as_deref().map(read_previous).transpose()?;

    engine.merge_quotes(quotes);
    let output = engine.compute(
        &holdings_file.holdings,
        holdings_file.cash,
        previous.as_ref(),
        chrono::Utc::now(),
    );

    cross_check_nav(output.snapshot.total_value, holdings_file.total_value);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let direction = args
        .direction
        .map(DirectionArg::direction)
        .unwrap_or_else(|| args.sort.key().default_direction());
    let ordered = engine.rank(&output.snapshot, args.sort.key(), direction);

    print_positions(&ordered);
    print_sectors(&output.snapshot);
    print_totals(&output);
    Ok(())
}

// ==============================================================================
// Watch Command Logic
// ==============================================================================

/// Drives the engine the way the dashboard's refresh scheduler would:
/// a fixed-interval tick supplying a fresh quote batch each cycle.
async fn handle_watch(args: WatchArgs) -> anyhow::Result<()> {
    let config = load_configuration(args.config.as_deref())?;
    let refresh_interval = config.scheduler.refresh_interval();
    let mut engine = Engine::new(config)?;

    println!(
        "--- Watching {} against {} every {}s. Press Ctrl-C to stop. ---",
        args.holdings.display(),
        args.quotes.display(),
        refresh_interval.as_secs()
    );

    let mut previous: Option<PortfolioSnapshot> = None;
    let mut ticker = tokio::time::interval(refresh_interval);

    loop {
        ticker.tick().await;
        // A failed tick (file mid-write, transient parse error) leaves the
        // prior snapshot valid; the next tick simply tries again.
        if let Err(e) = run_tick(&args, &mut engine, &mut previous) {
            eprintln!("[ERROR] Failed to process tick: {e:#}");
        }
    }
}

fn run_tick(
    args: &WatchArgs,
    engine: &mut Engine,
    previous: &mut Option<PortfolioSnapshot>,
) -> anyhow::Result<()> {
    let holdings_file = read_holdings(&args.holdings)?;
    let quotes = read_quotes(&args.quotes)?;

    engine.merge_quotes(quotes);
    let output = engine.compute(
        &holdings_file.holdings,
        holdings_file.cash,
        previous.as_ref(),
        chrono::Utc::now(),
    );
    cross_check_nav(output.snapshot.total_value, holdings_file.total_value);

    println!(
        "total {:.2}  gain {:.2} ({:.2}%)  delta {:.2} ({:.2}%)  score {}/10",
        output.snapshot.total_value.round_dp(2),
        output.snapshot.total_gain.round_dp(2),
        output.snapshot.total_gain_percent.round_dp(2),
        output.delta.absolute.round_dp(2),
        output.delta.percent.round_dp(2),
        output.snapshot.diversification_score,
    );

    *previous = Some(output.snapshot);
    Ok(())
}

// ==============================================================================
// Presentation (the only place values are rounded)
// ==============================================================================

fn print_positions(positions: &[core_types::PositionMetrics]) {
    let mut table = Table::new();
    table.set_header(vec![
        "Symbol", "Sector", "Qty", "Price", "Value", "Gain", "Gain %", "Weight %", "Flags",
    ]);

    for position in positions {
        let flags = match position.price_source {
            core_types::PriceSource::Fresh => "",
            core_types::PriceSource::Stale => "stale",
            core_types::PriceSource::Unpriced => "unpriced",
        };
        table.add_row(vec![
            Cell::new(&position.symbol),
            Cell::new(&position.sector),
            Cell::new(position.quantity),
            Cell::new(position.price.round_dp(2)),
            Cell::new(position.value.round_dp(2)),
            Cell::new(position.gain.round_dp(2)),
            Cell::new(position.gain_percent.round_dp(2)),
            Cell::new(position.weight.round_dp(2)),
            Cell::new(flags),
        ]);
    }
    println!("{table}");
}

fn print_sectors(snapshot: &PortfolioSnapshot) {
    let mut table = Table::new();
    table.set_header(vec!["Sector", "Value", "% of Portfolio", "Overweight"]);
    for bucket in &snapshot.sector_buckets {
        table.add_row(vec![
            Cell::new(&bucket.sector),
            Cell::new(bucket.value.round_dp(2)),
            Cell::new(bucket.percent_of_portfolio.round_dp(2)),
            Cell::new(if bucket.overweight { "yes" } else { "" }),
        ]);
    }
    println!("{table}");
}

fn print_totals(output: &CycleOutput) {
    let snapshot = &output.snapshot;
    println!(
        "Total value: {:.2} (cash {:.2})  Cost: {:.2}  Gain: {:.2} ({:.2}%)",
        snapshot.total_value.round_dp(2),
        snapshot.cash.round_dp(2),
        snapshot.total_cost.round_dp(2),
        snapshot.total_gain.round_dp(2),
        snapshot.total_gain_percent.round_dp(2),
    );
    println!(
        "Change vs previous: {:.2} ({:.2}%)",
        output.delta.absolute.round_dp(2),
        output.delta.percent.round_dp(2),
    );
    println!("Diversification score: {}/10", snapshot.diversification_score);
    if !snapshot.overweight_sectors.is_empty() {
        println!("Overweight sectors: {}", snapshot.overweight_sectors.join(", "));
    }
    for rejected in &snapshot.invalid {
        println!("Excluded invalid holding '{}': {}", rejected.symbol, rejected.reason);
    }
}
