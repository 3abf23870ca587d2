//! Backtest Sweep Runner
//!
//! Expands a sweep file into backtest jobs, runs them against a Gekko API with
//! bounded concurrency and writes every successful result to a CSV file.

use anyhow::{Context, Result};
use batchtrade::application::sweep::aggregator::log_failure;
use batchtrade::application::sweep::{Aggregator, SweepEngine, SweepReporter};
use batchtrade::config::{DEFAULT_CONFIG_PATH, SweepConfig, SweepEnvConfig};
use batchtrade::infrastructure::{CsvResultRecorder, GekkoClient, TomlStrategyLoader};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Backtest parameter sweep runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SweepArgs {
    /// TOML file describing the sweep
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Randomize job order
    #[arg(long)]
    shuffle: bool,

    /// Maximum number of backtests in flight
    #[arg(short, long)]
    parallel: Option<usize>,

    /// CSV file for results
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every backtest of the sweep
    Run(SweepArgs),
    /// Expand the sweep and print its size without submitting anything
    Plan(SweepArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Plan(args) => plan(args),
    }
}

fn load_config(args: &SweepArgs) -> Result<SweepConfig> {
    let mut overrides = SweepEnvConfig::from_env();
    if args.shuffle {
        overrides.shuffle = Some(true);
    }
    if let Some(parallel) = args.parallel {
        overrides.parallel_queries = Some(parallel);
    }
    if let Some(output) = &args.output {
        overrides.results_path = Some(output.clone());
    }

    SweepConfig::load(&args.config)
        .and_then(|config| config.with_env(&overrides))
        .with_context(|| format!("Invalid sweep configuration: {}", args.config.display()))
}

fn build_engine(config: &SweepConfig) -> Result<SweepEngine> {
    let service = Arc::new(
        GekkoClient::new(&config.api_url, config.request_timeout())
            .context("Failed to set up the backtest client")?,
    );
    let loader = Arc::new(TomlStrategyLoader::new(config.strategies_dir()));
    Ok(SweepEngine::new(service, loader, config.parallel_queries))
}

fn plan(args: SweepArgs) -> Result<()> {
    let config = load_config(&args)?;
    let engine = build_engine(&config)?;
    let plan = engine
        .plan(&config)
        .context("Failed to expand parameter space")?;

    let reporter = SweepReporter::default();
    reporter.print_plan(plan.len(), engine.concurrency());
    println!("Candle sizes:  {:?}", config.candle_sizes);
    println!("History sizes: {:?}", config.history_sizes);
    println!("Pairs:         {}", config.trading_pairs.len());
    println!("Methods:       {:?}", config.methods);
    Ok(())
}

async fn run(args: SweepArgs) -> Result<()> {
    let config = load_config(&args)?;
    let engine = build_engine(&config)?;

    // Everything that can stop the sweep happens before the first request
    let plan = engine
        .plan(&config)
        .context("Failed to expand parameter space")?;
    let reporter = SweepReporter::default();
    reporter.print_plan(plan.len(), engine.concurrency());

    let recorder = Arc::new(
        CsvResultRecorder::create(&config.results_path).with_context(|| {
            format!(
                "Failed to create results file {}",
                config.results_path.display()
            )
        })?,
    );

    // One failure channel for the whole sweep
    let (failure_tx, mut failure_rx) = mpsc::unbounded_channel();
    let failure_log = tokio::spawn(async move {
        let mut failures = 0usize;
        while let Some(failure) = failure_rx.recv().await {
            failures += 1;
            log_failure(&failure);
        }
        failures
    });

    let mut aggregator = Aggregator::new(recorder).with_failure_channel(failure_tx);
    let stats = engine.execute(plan, &mut aggregator).await;
    let report = reporter.render(&aggregator);
    let tally = reporter.render_stats(&stats);

    // Dropping the aggregator closes the channel
    drop(aggregator);
    let failures = failure_log.await.context("Failure logger stopped unexpectedly")?;
    info!(failures, "All jobs resolved");

    print!("{}", report);
    println!("{}", tally);
    Ok(())
}
