//! Truck loading CLI.

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use truckpack::loader::{Comparison, Outcome, COMPARE};
use truckpack::{handle, PackRequest, PackResponse, PackingResult, Registry};

#[derive(Parser)]
#[command(name = "truckpack")]
#[command(about = "Load cartons into a truck with interchangeable packing strategies")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered strategies
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pack a request file with one strategy
    Pack {
        /// Path to the JSON request
        request: PathBuf,

        /// Strategy name or "auto"; overrides the request's algorithm
        #[arg(short, long)]
        algorithm: Option<String>,

        /// RNG seed; overrides the request's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Time budget in milliseconds; overrides the request's budget
        #[arg(short, long)]
        time_limit: Option<u64>,

        /// Write the JSON response here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run several strategies on a request file and rank them
    Compare {
        /// Path to the JSON request
        request: PathBuf,

        /// Strategies to compare (default: all)
        #[arg(short, long, value_delimiter = ',')]
        strategies: Vec<String>,

        /// RNG seed; overrides the request's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Time budget per strategy in milliseconds
        #[arg(short, long)]
        time_limit: Option<u64>,

        /// Write the JSON response here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let registry = Registry::standard();

    match cli.command {
        Commands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(registry.list())?);
            } else {
                println!("Available strategies:");
                println!("{:-<78}", "");
                for info in registry.list() {
                    println!("  {:<20} {:<22} {}", info.name, info.display_name, info.complexity_class);
                    println!("  {:<20} {}", "", info.description);
                    println!("  {:<20} best for: {}", "", info.best_for);
                }
                println!("\nUse 'truckpack pack <REQUEST> -a <NAME>' or '-a auto'");
            }
        }

        Commands::Pack {
            request,
            algorithm,
            seed,
            time_limit,
            output,
        } => {
            let mut request = read_request(&request)?;
            if let Some(algorithm) = algorithm {
                request.algorithm = algorithm;
            }
            apply_overrides(&mut request, seed, time_limit);

            let response = handle(&registry, request).context("packing failed")?;
            print_response(&response);
            write_output(output.as_deref(), &response)?;
        }

        Commands::Compare {
            request,
            strategies,
            seed,
            time_limit,
            output,
        } => {
            let mut request = read_request(&request)?;
            request.algorithm = COMPARE.to_string();
            if !strategies.is_empty() {
                request.strategies = Some(strategies);
            }
            apply_overrides(&mut request, seed, time_limit);

            let response = handle(&registry, request).context("comparison failed")?;
            print_response(&response);
            write_output(output.as_deref(), &response)?;
        }
    }

    Ok(())
}

fn read_request(path: &Path) -> anyhow::Result<PackRequest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read request {}", path.display()))?;
    PackRequest::from_json(&json).with_context(|| format!("invalid request {}", path.display()))
}

fn apply_overrides(request: &mut PackRequest, seed: Option<u64>, time_limit: Option<u64>) {
    if seed.is_some() {
        request.options.seed = seed;
    }
    if time_limit.is_some() {
        request.options.time_budget_ms = time_limit;
    }
}

fn write_output(path: Option<&Path>, response: &PackResponse) -> anyhow::Result<()> {
    if let Some(path) = path {
        let json = serde_json::to_string_pretty(response)?;
        std::fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
        println!("Response saved to: {}", path.display());
    }
    Ok(())
}

fn print_response(response: &PackResponse) {
    match response {
        PackResponse::Single { algorithm, result } => print_result(algorithm, result),
        PackResponse::Comparison(comparison) => print_comparison(comparison),
    }
}

fn print_result(algorithm: &str, result: &PackingResult) {
    let total = result.placed_count() + result.unplaced.len();
    println!("Strategy:     {}", algorithm);
    println!("Placed:       {}/{}", result.placed_count(), total);
    println!("Volume:       {}", result.utilization_percent());
    println!("Weight:       {:.1}%", result.metrics.weight_utilization * 100.0);
    println!("Stability:    {:.3}", result.metrics.stability);
    println!("Efficiency:   {:.4}", result.efficiency());
    println!("Stop reason:  {:?}", result.stop_reason);
    println!("Time:         {}ms", result.elapsed_ms);
    for unplaced in &result.unplaced {
        println!("  unplaced: {} #{}", unplaced.carton_id, unplaced.ordinal);
    }
}

fn print_comparison(comparison: &Comparison) {
    println!(
        "{:<5} {:<20} {:>10} {:>8} {:>8} {:>9} {:>8}",
        "rank", "strategy", "efficiency", "volume", "weight", "unplaced", "time"
    );
    println!("{:-<74}", "");
    for entry in &comparison.entries {
        match &entry.outcome {
            Outcome::Packed(result) => println!(
                "{:<5} {:<20} {:>10.4} {:>7.1}% {:>7.1}% {:>9} {:>6}ms",
                entry.rank,
                entry.algorithm,
                result.efficiency(),
                result.metrics.volume_utilization * 100.0,
                result.metrics.weight_utilization * 100.0,
                result.unplaced.len(),
                result.elapsed_ms
            ),
            Outcome::Failed { error } => {
                println!("{:<5} {:<20} FAILED: {}", entry.rank, entry.algorithm, error)
            }
        }
    }
    if let Some(best) = &comparison.best {
        println!("\nBest: {}", best);
    }
}
