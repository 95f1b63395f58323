//! u-yard CLI - run, check and benchmark yard strategies
//!
//! Provides commands for:
//! - Running a strategy over a unit file and writing its action log
//! - Replaying a log against its unit file
//! - Generating random unit files
//! - Benchmarking strategies on random streams
//!
//! Binary: u-yard

use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use u_yard::config::{SimpleConfig, StagedConfig};
use u_yard::generator::UnitGenerator;
use u_yard::loader::{load_units, write_units, LoadError};
use u_yard::log::{Action, ActionSink, LogError, LogWriter, NullSink};
use u_yard::models::Unit;
use u_yard::render::render;
use u_yard::replay::{replay_with, ReplayError};
use u_yard::scheduler::{run, RunSummary, SimpleStrategy, StagedStrategy, Strategy, StrategyError};
use u_yard::validation::validate_units;

/// Yard width used when neither a flag nor a config file sets one.
const DEFAULT_WIDTH: usize = 35;

/// Rows drawn by `--show`.
const SHOW_ROWS: usize = 15;

/// u-yard - container yard simulation
#[derive(Parser)]
#[command(name = "u-yard")]
#[command(about = "Container yard simulation with replayable action logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyKind {
    /// Time-staged strategy with admission control
    Staged,
    /// One pair of stacks per unit size
    Simple,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a strategy over a unit file and write the action log
    Run {
        /// Unit file
        #[arg(long)]
        units: PathBuf,

        /// Action log to write
        #[arg(long)]
        log: PathBuf,

        /// Yard width (overrides the config file)
        #[arg(long)]
        width: Option<usize>,

        /// Strategy to run
        #[arg(long, value_enum, default_value = "staged")]
        strategy: StrategyKind,

        /// JSON strategy configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Replay the log afterwards and draw the yard
        #[arg(long)]
        show: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check an action log against its unit file
    Check {
        /// Unit file
        #[arg(long)]
        units: PathBuf,

        /// Action log to check
        #[arg(long)]
        log: PathBuf,

        /// Draw the yard after each action
        #[arg(long)]
        show: bool,

        /// Pause between drawn actions
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
    },

    /// Write a random unit file
    Generate {
        /// Number of units
        #[arg(long)]
        count: usize,

        /// Random seed
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Output file
        #[arg(long)]
        out: PathBuf,
    },

    /// Benchmark a strategy on random unit streams
    Evaluate {
        /// Number of runs
        #[arg(long, default_value_t = 10)]
        runs: usize,

        /// Units per run
        #[arg(long, default_value_t = 1000)]
        count: usize,

        /// Yard width
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: usize,

        /// Strategy to run
        #[arg(long, value_enum, default_value = "staged")]
        strategy: StrategyKind,

        /// Seed of the first run; run i uses seed + i
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("{0} invalid unit record(s)")]
    InvalidUnits(usize),

    #[error("config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error("log rejected: {0}")]
    Replay(#[from] ReplayError),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn read_checked_units(path: &Path) -> Result<Vec<Unit>, CliError> {
    let units = load_units(path)?;
    if let Err(errors) = validate_units(&units) {
        for e in &errors {
            warn!(kind = ?e.kind, "{}", e.message);
        }
        return Err(CliError::InvalidUnits(errors.len()));
    }
    Ok(units)
}

fn build_strategy<'a, S>(
    kind: StrategyKind,
    width: Option<usize>,
    config: Option<&Path>,
    sink: S,
) -> Result<Box<dyn Strategy + 'a>, CliError>
where
    S: ActionSink + 'a,
{
    Ok(match kind {
        StrategyKind::Staged => {
            let mut cfg = match config {
                Some(path) => read_json::<StagedConfig>(path)?,
                None => StagedConfig::new(width.unwrap_or(DEFAULT_WIDTH)),
            };
            if let Some(w) = width {
                if w != cfg.width && cfg.layout.waiting_end == cfg.width {
                    cfg.layout.waiting_end = w;
                }
                cfg.width = w;
            }
            Box::new(StagedStrategy::new(&cfg, sink)?)
        }
        StrategyKind::Simple => {
            let mut cfg = match config {
                Some(path) => read_json::<SimpleConfig>(path)?,
                None => SimpleConfig::new(DEFAULT_WIDTH),
            };
            if let Some(w) = width {
                cfg.width = w;
            }
            Box::new(SimpleStrategy::new(&cfg, sink)?)
        }
    })
}

/// Seed of benchmark run `run`; wraps around at `u64::MAX`.
fn run_seed(base: u64, run: usize) -> u64 {
    base.wrapping_add(run as u64)
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    println!("strategy:   {}", summary.strategy);
    println!("units:      {}", summary.units);
    println!(
        "placed:     {} (rejected {}, unplaced {})",
        summary.placed, summary.rejected, summary.unplaced
    );
    println!(
        "delivered:  {} (expired {}, remaining {})",
        summary.delivered, summary.expired, summary.remaining
    );
    println!("moves:      {}", summary.moves);
    println!("stages:     {}", summary.stages);
    println!("final time: {}", summary.final_time);
    println!(
        "cash:       {} of {} ({:.1}%)",
        summary.cash,
        summary.potential_cash,
        summary.capture_rate * 100.0
    );
    Ok(())
}

/// Replays `log`, drawing each step when `show` is set.
fn check_log(units: &[Unit], log: &Path, show: bool, delay: Duration) -> Result<(), CliError> {
    let reader = BufReader::new(File::open(log)?);
    let mut name = String::new();
    let report = replay_with(units, reader, |yard, action| {
        if let Action::Start { strategy, .. } = action {
            name = strategy.clone();
        }
        if show {
            let caption = format!("{name} t: {}", action.time());
            print!("{}", render(yard, &caption, SHOW_ROWS));
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
    })?;
    info!(
        strategy = report.strategy.as_str(),
        actions = report.actions,
        cash = report.cash(),
        "log accepted"
    );
    println!(
        "OK {} width {}: {} actions, final time {}, cash {}",
        report.strategy,
        report.width,
        report.actions,
        report.final_time,
        report.cash()
    );
    Ok(())
}

fn execute(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Run {
            units,
            log,
            width,
            strategy,
            config,
            show,
            json,
        } => {
            let records = read_checked_units(&units)?;
            let mut writer = LogWriter::create(&log)?;
            let summary = {
                let mut s = build_strategy(strategy, width, config.as_deref(), &mut writer)?;
                run(s.as_mut(), &records)?
            };
            writer.finish()?;
            info!(log = %log.display(), "action log written");
            print_summary(&summary, json)?;
            if show {
                check_log(&records, &log, true, Duration::ZERO)?;
            }
        }
        Commands::Check {
            units,
            log,
            show,
            delay_ms,
        } => {
            let records = load_units(&units)?;
            check_log(&records, &log, show, Duration::from_millis(delay_ms))?;
        }
        Commands::Generate { count, seed, out } => {
            let records = UnitGenerator::new(seed).generate(count);
            write_units(BufWriter::new(File::create(&out)?), &records)?;
            info!(count, seed, out = %out.display(), "units written");
        }
        Commands::Evaluate {
            runs,
            count,
            width,
            strategy,
            seed,
        } => {
            let mut total_rate = 0.0;
            for i in 0..runs {
                let records = UnitGenerator::new(run_seed(seed, i)).generate(count);
                let begin = Instant::now();
                let mut s = build_strategy(strategy, Some(width), None, NullSink)?;
                let summary = run(s.as_mut(), &records)?;
                println!(
                    "{count} {width}: {}$. Total money: {} | elapsed time: {:.3}s",
                    summary.cash,
                    summary.potential_cash,
                    begin.elapsed().as_secs_f64()
                );
                total_rate += summary.capture_rate;
            }
            if runs > 0 {
                println!(
                    "mean capture rate: {:.1}%",
                    100.0 * total_rate / runs as f64
                );
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "u_yard=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
