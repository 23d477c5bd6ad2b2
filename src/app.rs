//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the solver command (flag or `CURV_SOLVER`)
//! - runs extraction / detection / assembly via the shared pipeline
//! - writes NDJSON and AsciiMath outputs
//! - prints the run summary and surfaces every recovered failure on stderr
//!
//! A batch that completes exits 0 even with per-record failures; only
//! unrecoverable setup errors (missing input, unusable solver command,
//! unwritable output) terminate with a non-zero status.

use std::time::Duration;

use clap::Parser;

use crate::cli::{Cli, Command, ExtractArgs, RunArgs, SolverArgs, TimelineArgs};
use crate::error::AppError;
use crate::solver::SolverGateway;

pub mod pipeline;

/// Entry point for the `curv` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Extract(args) => handle_extract(args),
        Command::Timeline(args) => handle_timeline(args),
        Command::Run(args) => handle_run(args),
    }
}

fn handle_extract(args: ExtractArgs) -> Result<(), AppError> {
    let gateway = solver_gateway(&args.solver)?;
    let run = pipeline::run_extract(
        &gateway,
        &args.input,
        args.input_am.as_deref(),
        args.solver.jobs,
    )?;

    crate::io::export::write_diagnostics_ndjson(&args.output_json, &run.outcome.diagnostics)?;
    if let Some(path) = &args.output_am {
        let text = crate::io::asciimath::render_diagnostics(&run.outcome.diagnostics);
        crate::io::asciimath::write_asciimath(path, &text)?;
    }
    if let Some(path) = &args.failures {
        crate::io::export::write_failures_ndjson(path, &run.outcome.failures)?;
    }

    print!("{}", crate::report::format_extract_summary(&run));
    surface_failures(&run);
    Ok(())
}

fn handle_timeline(args: TimelineArgs) -> Result<(), AppError> {
    let batch = crate::io::ingest::load_diagnostic_records(&args.input)?;
    if let Some(path) = &args.input_am {
        // The mirror duplicates the NDJSON content; nothing in it is
        // load-bearing.
        let _ = crate::io::ingest::load_summary_mirror(path);
    }

    let thresholds = args.thresholds.to_thresholds();
    let timeline = pipeline::build_timeline(&batch.records, &thresholds);

    crate::io::export::write_timeline_ndjson(&args.output_json, &timeline)?;
    if let Some(path) = &args.output_am {
        let text = crate::io::asciimath::render_timeline(&timeline);
        crate::io::asciimath::write_asciimath(path, &text)?;
    }

    print!(
        "{}",
        crate::report::format_timeline_summary(
            batch.records.len(),
            batch.line_errors.len(),
            &timeline,
            &thresholds,
        )
    );
    if let Some(report) = crate::report::format_failure_report(&batch.line_errors, &[]) {
        eprint!("{report}");
    }
    Ok(())
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let gateway = solver_gateway(&args.solver)?;
    let run = pipeline::run_extract(
        &gateway,
        &args.input,
        args.input_am.as_deref(),
        args.solver.jobs,
    )?;

    if let Some(path) = &args.diagnostics_json {
        crate::io::export::write_diagnostics_ndjson(path, &run.outcome.diagnostics)?;
    }
    if let Some(path) = &args.failures {
        crate::io::export::write_failures_ndjson(path, &run.outcome.failures)?;
    }

    let thresholds = args.thresholds.to_thresholds();
    let timeline = pipeline::build_timeline(&run.outcome.diagnostics, &thresholds);

    crate::io::export::write_timeline_ndjson(&args.output_json, &timeline)?;
    if let Some(path) = &args.output_am {
        let text = crate::io::asciimath::render_timeline(&timeline);
        crate::io::asciimath::write_asciimath(path, &text)?;
    }

    print!("{}", crate::report::format_extract_summary(&run));
    print!(
        "{}",
        crate::report::format_timeline_summary(
            run.outcome.diagnostics.len(),
            0,
            &timeline,
            &thresholds,
        )
    );
    surface_failures(&run);
    Ok(())
}

fn surface_failures(run: &pipeline::ExtractRun) {
    if let Some(report) =
        crate::report::format_failure_report(&run.batch.line_errors, &run.outcome.failures)
    {
        eprint!("{report}");
    }
}

/// Resolve the solver command: the `--solver` flag wins, otherwise
/// `CURV_SOLVER` from the environment (a `.env` file is honored).
fn solver_gateway(args: &SolverArgs) -> Result<SolverGateway, AppError> {
    dotenvy::dotenv().ok();
    let command_line = match &args.solver {
        Some(command_line) => command_line.clone(),
        None => std::env::var("CURV_SOLVER").map_err(|_| {
            AppError::new(
                2,
                "No solver command: pass --solver or set CURV_SOLVER in the environment (.env).",
            )
        })?,
    };
    SolverGateway::parse(&command_line, Duration::from_secs(args.solver_timeout))
}
