//! Shared pipeline logic used by the `extract`, `timeline`, and `run`
//! subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> solver batch -> diagnostics -> detection -> timeline
//!
//! Each stage returns owned collections; nothing accumulates in ambient
//! state, so every stage is independently testable.

use std::path::Path;

use crate::domain::{DiagnosticRecord, Event, ParameterRecord, Thresholds, Timeline};
use crate::error::AppError;
use crate::extract::{ExtractOutcome, extract};
use crate::io::ingest::{IngestedBatch, load_parameter_records, load_summary_mirror};
use crate::solver::SolverGateway;

/// All outputs of the extraction stage.
#[derive(Debug, Clone)]
pub struct ExtractRun {
    pub batch: IngestedBatch<ParameterRecord>,
    pub outcome: ExtractOutcome,
    /// Whether the optional AsciiMath input mirror was present and readable.
    pub mirror_seen: bool,
}

/// Ingest the convergence file and run the solver over every valid record.
pub fn run_extract(
    gateway: &SolverGateway,
    input: &Path,
    input_am: Option<&Path>,
    jobs: usize,
) -> Result<ExtractRun, AppError> {
    let batch = load_parameter_records(input)?;

    // The mirror duplicates the NDJSON content; it is only acknowledged.
    let mirror_seen = input_am.is_some_and(|path| load_summary_mirror(path).is_some());

    let outcome = extract(gateway, &batch.records, jobs)?;

    Ok(ExtractRun {
        batch,
        outcome,
        mirror_seen,
    })
}

/// Detect events per diagnostic record and assemble the ordered timeline.
///
/// `diagnostics` must be in record input order; that order is the first
/// tie-break for equal-time events.
pub fn build_timeline(diagnostics: &[DiagnosticRecord], thresholds: &Thresholds) -> Timeline {
    let event_lists: Vec<Vec<Event>> = diagnostics
        .iter()
        .map(|diag| crate::events::detect(diag, thresholds))
        .collect();
    crate::events::assemble(&event_lists)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;
    use crate::domain::{EventKind, FailureKind, ParameterMap};

    fn diagnostic(run: f64, max_r: f64, violations: Vec<(f64, f64)>) -> DiagnosticRecord {
        DiagnosticRecord {
            record: ParameterRecord::from_parameters(ParameterMap::from([(
                "run".to_string(),
                run,
            )])),
            max_r,
            peak_r2: 0.0,
            max_r_time: None,
            violations,
        }
    }

    #[test]
    fn timeline_merges_events_across_records_in_time_order() {
        let diagnostics = vec![
            diagnostic(0.0, 0.5, vec![(0.8, 2e-6)]),
            diagnostic(1.0, 0.0, vec![(0.2, 5e-6)]),
        ];
        let timeline = build_timeline(&diagnostics, &Thresholds::default());

        // Sorted by time, then record order, then kind: run 1's violation at
        // t=0.2, run 0's violation at t=0.8, run 0's peak at t=0.8.
        let kinds: Vec<(f64, EventKind)> = timeline
            .events()
            .iter()
            .map(|e| (e.time, e.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (0.2, EventKind::ConstraintViolation),
                (0.8, EventKind::ConstraintViolation),
                (0.8, EventKind::CurvaturePeak),
            ]
        );
        assert_eq!(timeline.events()[1].params["run"], 0.0);
    }

    #[test]
    fn quiet_diagnostics_build_an_empty_timeline() {
        let diagnostics = vec![diagnostic(0.0, 0.05, vec![(0.1, 1e-9)])];
        let timeline = build_timeline(&diagnostics, &Thresholds::default());
        assert!(timeline.is_empty());
    }

    #[test]
    fn end_to_end_extract_and_timeline() {
        let mut input = tempfile::NamedTempFile::new().unwrap();
        writeln!(input, r#"{{"parameters":{{"grid":128,"dr":0.01,"dt":0.005}}}}"#).unwrap();
        writeln!(input, r#"{{"parameters":{{"grid":64,"boom":1}}}}"#).unwrap();
        writeln!(input, "not json").unwrap();
        input.flush().unwrap();

        let gateway = SolverGateway::new(
            vec![
                "sh".to_string(),
                "-c".to_string(),
                r#"case "$(cat)" in
                     *boom*) exit 7;;
                     *) echo '{"max_R":0.123,"peak_R2":0.000456,"violations":[[0.0,1e-7],[0.1,2e-7]]}';;
                   esac"#
                    .to_string(),
            ],
            Duration::from_secs(5),
        )
        .unwrap();

        let run = run_extract(&gateway, input.path(), None, 0).unwrap();
        assert_eq!(run.batch.lines_read, 3);
        assert_eq!(run.batch.line_errors.len(), 1);
        assert_eq!(run.outcome.diagnostics.len(), 1);
        assert_eq!(run.outcome.failures.len(), 1);
        assert_eq!(run.outcome.failures[0].kind, FailureKind::ProcessError);

        let thresholds = Thresholds {
            curvature: 0.1,
            violation: 1e-6,
        };
        let timeline = build_timeline(&run.outcome.diagnostics, &thresholds);

        // Violations stay below threshold; max_R clears the screen, timed at
        // the end of the non-decreasing violation prefix.
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.events()[0].kind, EventKind::CurvaturePeak);
        assert_eq!(timeline.events()[0].time, 0.1);
        assert_eq!(timeline.events()[0].magnitude, 0.123);
    }
}
