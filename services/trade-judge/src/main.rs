//! Trade Judge CLI
//!
//! Subcommands:
//!   - `judge`     Recommend long/short/flat for a proposed trade
//!   - `neighbors` List the ranked similar cases for a proposal
//!   - `merge`     Merge a journal export into a record file
//!   - `config`    Print the effective configuration

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use record_store::{HistoricalTrade, RecordStore};
use tracing::info;
use trade_judge::{JudgeConfig, JudgeEngine, ProposedTrade};

#[derive(Parser)]
#[command(
    name = "trade-judge",
    version,
    about = "Case-based long/short/flat recommendation from your own trade journal",
    propagate_version = true
)]
struct Cli {
    /// Log every engine stage
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a proposed trade
    Judge(JudgeArgs),
    /// Show the similar cases a proposal would be judged on
    Neighbors(NeighborsArgs),
    /// Merge an exported journal into a record file
    Merge(MergeArgs),
    /// Print the effective configuration
    Config {
        /// TOML/JSON/YAML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Journal export (or bare JSON array of records)
    #[arg(long)]
    records: PathBuf,

    /// Proposal JSON file
    #[arg(long, conflicts_with = "record_id", required_unless_present = "record_id")]
    proposal: Option<PathBuf>,

    /// Judge an existing journal record instead of a proposal file
    #[arg(long)]
    record_id: Option<String>,

    /// Minimum win rate in percent, overriding the proposal's
    #[arg(long)]
    min_win_rate: Option<f64>,

    /// TOML/JSON/YAML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct JudgeArgs {
    #[command(flatten)]
    query: QueryArgs,

    /// Pretty-print the JSON result
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Print a one-line summary instead of JSON
    #[arg(long, default_value_t = false)]
    summary: bool,
}

#[derive(Args)]
struct NeighborsArgs {
    #[command(flatten)]
    query: QueryArgs,

    /// Show at most this many neighbors
    #[arg(long, default_value_t = 20)]
    limit: usize,
}

#[derive(Args)]
struct MergeArgs {
    /// Record file to update (created when missing)
    #[arg(long)]
    into: PathBuf,

    /// Export file to import
    #[arg(long)]
    from: PathBuf,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging on stderr so stdout stays machine-readable
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Judge(args) => run_judge(args),
        Commands::Neighbors(args) => run_neighbors(args),
        Commands::Merge(args) => run_merge(args),
        Commands::Config { config } => {
            let config = JudgeConfig::load(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Everything a query subcommand needs
struct Query {
    engine: JudgeEngine,
    proposal: ProposedTrade,
    /// Same-market records, without the record being judged
    history: Vec<HistoricalTrade>,
    total: usize,
}

/// Load config, records and the proposal for a query subcommand
fn load_query(args: &QueryArgs) -> anyhow::Result<Query> {
    let config = JudgeConfig::load(args.config.as_deref()).context("loading config")?;
    let store = RecordStore::load(&args.records)
        .with_context(|| format!("loading records from {}", args.records.display()))?;

    let mut proposal = match (&args.proposal, &args.record_id) {
        (Some(path), _) => ProposedTrade::load(path)
            .with_context(|| format!("loading proposal from {}", path.display()))?,
        (None, Some(id)) => store
            .trades()
            .iter()
            .find(|t| &t.id == id)
            .map(ProposedTrade::from_trade)
            .with_context(|| format!("no record with id {}", id))?,
        (None, None) => anyhow::bail!("either --proposal or --record-id is required"),
    };
    if let Some(min) = args.min_win_rate {
        proposal.min_win_rate = Some(min);
    }

    let history = store.history_for(
        &proposal.symbol,
        &proposal.timeframe,
        args.record_id.as_deref(),
    );
    Ok(Query {
        engine: JudgeEngine::new(config),
        proposal,
        history,
        total: store.len(),
    })
}

fn run_judge(args: JudgeArgs) -> anyhow::Result<()> {
    let query = load_query(&args.query)?;
    info!(
        "Judging {} {} against {} of {} records",
        query.proposal.symbol,
        query.proposal.timeframe,
        query.history.len(),
        query.total
    );

    let result = query.engine.judge(&query.proposal, &query.history);
    if args.summary {
        println!("{}", result.summary());
    } else if args.pretty {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", serde_json::to_string(&result)?);
    }
    Ok(())
}

fn run_neighbors(args: NeighborsArgs) -> anyhow::Result<()> {
    let query = load_query(&args.query)?;
    let neighbors = query.engine.neighbors(&query.proposal, &query.history);

    println!("{:<38} {:>6} {:>6} {:>8}", "id", "sim", "dir", "R");
    for n in neighbors.iter().take(args.limit) {
        println!(
            "{:<38} {:>6.3} {:>6} {:>8}",
            n.trade.id,
            n.similarity,
            n.trade.direction_taken.map(|d| d.as_str()).unwrap_or("-"),
            n.trade
                .realized_r()
                .map(|r| format!("{:.2}", r))
                .unwrap_or_else(|| "-".to_string())
        );
    }
    info!("{} neighbors ({} shown)", neighbors.len(), neighbors.len().min(args.limit));
    Ok(())
}

fn run_merge(args: MergeArgs) -> anyhow::Result<()> {
    let mut store = if args.into.exists() {
        RecordStore::load(&args.into)?
    } else {
        RecordStore::new()
    };
    let incoming = RecordStore::load(&args.from)?;
    let summary = store.merge(incoming.records().to_vec());
    store.save(&args.into)?;
    println!(
        "{} added, {} updated, {} total",
        summary.added,
        summary.updated,
        store.len()
    );
    Ok(())
}
