// Syntropic Grid headless runner
//
// Usage:
//   cargo run --bin syntropic-grid                         # 10 ticks at 30% load
//   cargo run --bin syntropic-grid -- --load 90 --ticks 30
//   cargo run --bin syntropic-grid -- --inject n-03:R      # manual intervention before the run
//   cargo run --bin syntropic-grid -- --analyze            # needs $API_KEY
//   cargo run --bin syntropic-grid -- --config grid.yaml --seed 42 --json

mod report;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

use syntropic_grid::advisory::{Advisor, GeminiClient};
use syntropic_grid::runtime::SessionRuntime;
use syntropic_grid::{GridConfig, GridSession, Operator};

/// Run the syntropic grid simulation headless and print telemetry per tick
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Traffic load percentage (0-100), overrides the config
    #[arg(short, long)]
    load: Option<f64>,

    /// Number of ticks to run before exiting
    #[arg(short = 'n', long, default_value_t = 10)]
    ticks: u64,

    /// Seed for reproducible telemetry, overrides the config
    #[arg(long)]
    seed: Option<u64>,

    /// Manual intervention applied before the first tick, as NODE:OP (repeatable)
    #[arg(long = "inject", value_name = "NODE:OP")]
    inject: Vec<String>,

    /// Request an advisory analysis of the final snapshot
    #[arg(long)]
    analyze: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn parse_injection(raw: &str) -> Result<(&str, Operator)> {
    let (node, op) = raw.split_once(':')
        .ok_or_else(|| eyre!("expected NODE:OP, got '{}'", raw))?;
    let op: Operator = op.parse()?;
    Ok((node, op))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = match &args.config {
        Some(path) => GridConfig::load(path)
            .wrap_err_with(|| format!("Failed to load config '{}'", path.display()))?,
        None => GridConfig::default(),
    };
    if let Some(load) = args.load {
        config.traffic_load = load;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()?;
    LocalSet::new().block_on(&rt, run(args, config))
}

async fn run(args: Args, config: GridConfig) -> Result<()> {
    let session = GridSession::new(&config);
    let advisor = Advisor::new(GeminiClient::new(config.advisory.clone()));
    let runtime = SessionRuntime::start(session, advisor);

    for raw in &args.inject {
        let (node, op) = parse_injection(raw)?;
        if !runtime.apply_operator(node, op) {
            tracing::warn!(node, %op, "no such node; intervention only logged");
        }
    }

    let mut updates = runtime.subscribe();
    println!("\n  Syntropic Grid | load {:.0}% | period {:?} | {} tick(s)\n",
        config.traffic_load, config.tick_period, args.ticks);
    report::print_header();

    for tick in 1..=args.ticks {
        updates.changed().await?;
        let snapshot = updates.borrow_and_update().clone();
        report::print_tick(tick, &snapshot);
    }

    {
        let session = runtime.session();
        report::print_summary(&session.summary(), session.tick_count());
        report::print_log(&session.logs().to_vec());
    }

    if args.analyze {
        println!("\n  {}", syntropic_grid::advisory::ANALYZING_MESSAGE);
        let text = runtime.request_analysis().await?;
        println!("\n  {}\n", text);
    }

    if args.json {
        let snapshot = runtime.snapshot();
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    }

    runtime.shutdown();
    Ok(())
}
