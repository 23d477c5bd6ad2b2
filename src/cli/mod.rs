//! Command-line parsing for the curvature diagnostics pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the extraction/detection code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_CURVATURE_THRESHOLD, DEFAULT_VIOLATION_THRESHOLD, Thresholds};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "curv",
    version,
    about = "Strong-field curvature diagnostics and event timeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the solver over a convergence batch and write curvature diagnostics.
    Extract(ExtractArgs),
    /// Detect threshold events in a diagnostics file and write the event timeline.
    Timeline(TimelineArgs),
    /// Full pipeline: extraction and timeline assembly in one pass.
    Run(RunArgs),
}

/// Solver invocation options.
#[derive(Debug, Args, Clone)]
pub struct SolverArgs {
    /// Solver command line, whitespace-separated (e.g. "python solver.py").
    /// Falls back to CURV_SOLVER from the environment or a .env file.
    #[arg(long, value_name = "CMD")]
    pub solver: Option<String>,

    /// Per-invocation solver timeout in seconds.
    #[arg(long, default_value_t = 60)]
    pub solver_timeout: u64,

    /// Worker threads for the solver fan-out (0 = rayon default).
    #[arg(long, default_value_t = 0)]
    pub jobs: usize,
}

/// Detection threshold overrides.
#[derive(Debug, Args, Clone)]
pub struct ThresholdArgs {
    /// Curvature-peak threshold: emit an event when max_R is strictly above this.
    #[arg(long, default_value_t = DEFAULT_CURVATURE_THRESHOLD)]
    pub curvature_threshold: f64,

    /// Constraint-violation threshold: emit an event per sample strictly above this.
    #[arg(long, default_value_t = DEFAULT_VIOLATION_THRESHOLD)]
    pub violation_threshold: f64,
}

impl ThresholdArgs {
    pub fn to_thresholds(&self) -> Thresholds {
        Thresholds {
            curvature: self.curvature_threshold,
            violation: self.violation_threshold,
        }
    }
}

/// Options for `curv extract`.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Input convergence NDJSON file.
    #[arg(long, value_name = "NDJSON")]
    pub input: PathBuf,

    /// Optional AsciiMath mirror of the input (informational only).
    #[arg(long = "input-am", value_name = "AM")]
    pub input_am: Option<PathBuf>,

    /// Output diagnostics NDJSON file.
    #[arg(long = "output-json", value_name = "NDJSON")]
    pub output_json: PathBuf,

    /// Output AsciiMath diagnostics summary.
    #[arg(long = "output-am", value_name = "AM")]
    pub output_am: Option<PathBuf>,

    /// Write per-record extraction failures to an NDJSON report.
    #[arg(long, value_name = "NDJSON")]
    pub failures: Option<PathBuf>,

    #[command(flatten)]
    pub solver: SolverArgs,
}

/// Options for `curv timeline`.
#[derive(Debug, Args)]
pub struct TimelineArgs {
    /// Input diagnostics NDJSON file (as written by `curv extract`).
    #[arg(long, value_name = "NDJSON")]
    pub input: PathBuf,

    /// Optional AsciiMath mirror of the input (informational only).
    #[arg(long = "input-am", value_name = "AM")]
    pub input_am: Option<PathBuf>,

    /// Output timeline NDJSON file.
    #[arg(long = "output-json", value_name = "NDJSON")]
    pub output_json: PathBuf,

    /// Output AsciiMath timeline summary.
    #[arg(long = "output-am", value_name = "AM")]
    pub output_am: Option<PathBuf>,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

/// Options for `curv run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Input convergence NDJSON file.
    #[arg(long, value_name = "NDJSON")]
    pub input: PathBuf,

    /// Optional AsciiMath mirror of the input (informational only).
    #[arg(long = "input-am", value_name = "AM")]
    pub input_am: Option<PathBuf>,

    /// Also write the intermediate diagnostics NDJSON file.
    #[arg(long = "diagnostics-json", value_name = "NDJSON")]
    pub diagnostics_json: Option<PathBuf>,

    /// Output timeline NDJSON file.
    #[arg(long = "output-json", value_name = "NDJSON")]
    pub output_json: PathBuf,

    /// Output AsciiMath timeline summary.
    #[arg(long = "output-am", value_name = "AM")]
    pub output_am: Option<PathBuf>,

    /// Write per-record extraction failures to an NDJSON report.
    #[arg(long, value_name = "NDJSON")]
    pub failures: Option<PathBuf>,

    #[command(flatten)]
    pub solver: SolverArgs,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}
