//! Batch curvature extraction.
//!
//! Drives the solver gateway once per input record with partial-failure
//! semantics: one bad record degrades to a failure entry, the batch always
//! completes. Successes and failures each come back in original input order.

use rayon::prelude::*;

use crate::domain::{DiagnosticRecord, ExtractionFailure, ParameterRecord};
use crate::error::AppError;
use crate::solver::SolverGateway;

/// Extraction output for one batch.
///
/// Both collections are produced even when one is empty; callers must not
/// assume every record succeeds. `diagnostics.len() + failures.len()` always
/// equals the input batch size.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub diagnostics: Vec<DiagnosticRecord>,
    pub failures: Vec<ExtractionFailure>,
}

/// Run the solver over `records`, in input order.
///
/// `jobs` bounds the worker pool (`0` = rayon's default). Parallel execution
/// does not change output order: results are joined back by index, never by
/// completion order.
pub fn extract(
    gateway: &SolverGateway,
    records: &[ParameterRecord],
    jobs: usize,
) -> Result<ExtractOutcome, AppError> {
    let results = if jobs == 0 {
        run_batch(gateway, records)
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build solver worker pool: {e}")))?;
        pool.install(|| run_batch(gateway, records))
    };

    let mut diagnostics = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(diag) => diagnostics.push(diag),
            Err(fail) => failures.push(fail),
        }
    }

    Ok(ExtractOutcome {
        diagnostics,
        failures,
    })
}

fn run_batch(
    gateway: &SolverGateway,
    records: &[ParameterRecord],
) -> Vec<Result<DiagnosticRecord, ExtractionFailure>> {
    // Invocations are mutually independent: each gets its own process and
    // its own output buffers, so fan-out is safe.
    records
        .par_iter()
        .map(|record| gateway.invoke(record))
        .collect()
}
