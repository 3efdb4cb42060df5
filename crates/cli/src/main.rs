//! Differential testing CLI for page-table memory simulators.
//!
//! This binary drives a reference and a candidate simulator with identical arguments
//! and compares their standard output. It performs:
//! 1. **Scoring:** An exhaustive sweep of one configuration over every trace sequence of
//!    the requested length, tallying PASS/FAIL without stopping early.
//! 2. **Tester:** An unbounded fuzz loop over random configurations and trace tuples that
//!    stops at the first disagreement.
//!
//! Case lines go to stdout; logs go to stderr (filter with `RUST_LOG`).
//! Exit status: 0 on completion (FAIL counts included), 2 on a fuzz mismatch, 1 on any
//! other harness error.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pagediff_core::common::{Configuration, HarnessError};
use pagediff_core::config::{DepthMode, ExitPolicy, HarnessConfig, SamplingPolicy};
use pagediff_core::enumerate::{ConfigSampler, ExhaustivePlan, TracePool};
use pagediff_core::runner::{CaseRunner, ProcessCollaborator};
use pagediff_core::session::{FuzzSession, Sweep};
use pagediff_core::traces::TraceSet;

/// Exit status for a harness fault (spawn, exit, config, I/O).
const EXIT_FAILURE: u8 = 1;

/// Exit status for a fuzz mismatch.
const EXIT_MISMATCH: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "pagediff",
    author,
    version,
    about = "Differential tester for page-table memory simulators",
    long_about = "Run a reference and a candidate simulator on identical arguments and compare their stdout byte-for-byte.\n\nBoth binaries are invoked as `<binary> <firstLevelBits> <physicalMemoryBits> <trace>...`.\n\nExamples:\n  pagediff scoring 8 20 2\n  pagediff --trace-dir traces --workers 8 scoring 8 20 3\n  pagediff tester\n  pagediff tester --seed 42 --policy bit-budget"
)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by both subcommands; each overrides the config file.
#[derive(Args, Debug)]
struct Overrides {
    /// JSON configuration file (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory whose files are the trace universe.
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,

    /// Trusted simulator binary.
    #[arg(long, global = true)]
    reference: Option<PathBuf>,

    /// Simulator binary under test.
    #[arg(long, global = true)]
    candidate: Option<PathBuf>,

    /// Compare exit codes instead of aborting on a non-zero exit.
    #[arg(long, global = true)]
    compare_exit_status: bool,
}

impl Overrides {
    fn apply(&self, config: &mut HarnessConfig) {
        if let Some(dir) = &self.trace_dir {
            config.trace_dir.clone_from(dir);
        }
        if let Some(reference) = &self.reference {
            config.reference_binary.clone_from(reference);
        }
        if let Some(candidate) = &self.candidate {
            config.candidate_binary.clone_from(candidate);
        }
        if self.compare_exit_status {
            config.exit_policy = ExitPolicy::Compare;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Exhaustive sweep of one configuration over all trace sequences; prints a PASS/FAIL summary.
    Scoring {
        /// Size in bits of the first-level page-table index.
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        first_level_bits: u32,

        /// Size in bits of physical memory.
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        physical_memory_bits: u32,

        /// Number of traces per case.
        max_trace_count: usize,

        /// Cover only the exact trace count, or every count from 0 up to it.
        #[arg(long, value_enum)]
        depth: Option<DepthArg>,

        /// Cases in flight at once.
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Random cases until the first mismatch (or `--max-cases`).
    Tester {
        /// RNG seed for replaying a session.
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many passing cases.
        #[arg(long)]
        max_cases: Option<u64>,

        /// How configurations are drawn.
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DepthArg {
    Exact,
    Cumulative,
}

impl From<DepthArg> for DepthMode {
    fn from(arg: DepthArg) -> Self {
        match arg {
            DepthArg::Exact => Self::Exact,
            DepthArg::Cumulative => Self::Cumulative,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Independent,
    BitBudget,
}

impl From<PolicyArg> for SamplingPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Independent => Self::Independent,
            PolicyArg::BitBudget => Self::BitBudget,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("\n[!] FATAL: {err}");
            if err.is_mismatch() {
                ExitCode::from(EXIT_MISMATCH)
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }
}

/// Resolves the configuration (file, then flags) and dispatches the subcommand.
fn execute(cli: Cli) -> Result<(), HarnessError> {
    let mut config = match &cli.overrides.config {
        Some(path) => HarnessConfig::from_json_file(path)?,
        None => HarnessConfig::default(),
    };
    cli.overrides.apply(&mut config);

    match cli.command {
        Commands::Scoring {
            first_level_bits,
            physical_memory_bits,
            max_trace_count,
            depth,
            workers,
        } => {
            if let Some(depth) = depth {
                config.sweep.depth = depth.into();
            }
            if let Some(workers) = workers {
                config.sweep.workers = workers;
            }
            config.validate()?;
            let configuration = Configuration::new(first_level_bits, physical_memory_bits)?;
            cmd_scoring(&config, configuration, max_trace_count)
        }
        Commands::Tester {
            seed,
            max_cases,
            policy,
        } => {
            if seed.is_some() {
                config.fuzz.seed = seed;
            }
            if max_cases.is_some() {
                config.fuzz.max_cases = max_cases;
            }
            if let Some(policy) = policy {
                config.fuzz.policy = policy.into();
            }
            config.validate()?;
            cmd_tester(&config)
        }
    }
}

fn build_runner(config: &HarnessConfig) -> CaseRunner<ProcessCollaborator, ProcessCollaborator> {
    CaseRunner::new(
        ProcessCollaborator::new(&config.reference_binary),
        ProcessCollaborator::new(&config.candidate_binary),
        config.exit_policy,
    )
}

/// Runs the exhaustive sweep. FAIL verdicts are reported, never fatal.
fn cmd_scoring(
    config: &HarnessConfig,
    configuration: Configuration,
    max_trace_count: usize,
) -> Result<(), HarnessError> {
    let traces = TraceSet::discover(&config.trace_dir)?;
    let runner = build_runner(config);
    let plan = ExhaustivePlan::new(
        configuration,
        traces.files(),
        max_trace_count,
        config.sweep.depth,
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = Sweep::new(&runner, plan, config.sweep.workers).run(&mut out)?;
    out.flush()?;

    if !summary.all_passed() {
        warn!(failed = summary.failed(), "candidate disagreed with reference");
    }
    Ok(())
}

/// Runs the fuzz loop until the first mismatch or the configured case limit.
fn cmd_tester(config: &HarnessConfig) -> Result<(), HarnessError> {
    let traces = TraceSet::discover(&config.trace_dir)?;
    let runner = build_runner(config);
    let sampler = ConfigSampler::from_config(&config.fuzz)?;
    let pool = TracePool::new(traces.files(), config.fuzz.max_arity)?;
    let mut session = FuzzSession::new(
        &runner,
        sampler,
        pool,
        config.fuzz.seed,
        config.fuzz.max_cases,
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = session.run(&mut out);
    let flushed = out.flush();

    match result {
        Ok(report) => {
            flushed?;
            info!(cases = report.cases, seed = report.seed, "fuzz session finished");
            Ok(())
        }
        Err(err) => {
            if err.is_mismatch() {
                eprintln!("replay with: {}", replay_command(session.seed()));
            }
            Err(err)
        }
    }
}

/// The invoking command line with `--seed` pinned, so the session replays exactly.
///
/// Every other flag (config file, trace directory, binaries, policy) is carried over
/// verbatim.
fn replay_command(seed: u64) -> String {
    let mut args: Vec<String> = env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .map(|arg| {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                format!("'{arg}'")
            } else {
                arg
            }
        })
        .collect();
    let seeded = args
        .iter()
        .any(|arg| arg == "--seed" || arg.starts_with("--seed="));
    if !seeded {
        args.push("--seed".to_string());
        args.push(seed.to_string());
    }
    args.join(" ")
}
