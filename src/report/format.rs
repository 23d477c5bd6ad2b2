//! Formatted terminal output for pipeline runs.
//!
//! We keep formatting code in one place so:
//! - the extraction/detection code stays clean and testable
//! - output changes are localized (important for future snapshot tests)
//!
//! The run summary goes to stdout; the failure report goes to stderr so
//! recovered failures are visible even when stdout is piped onward.

use crate::app::pipeline::ExtractRun;
use crate::domain::{EventKind, ExtractionFailure, Thresholds, Timeline};
use crate::io::asciimath::format_params;
use crate::io::ingest::LineError;

/// Summary for `curv extract` (and the extraction half of `curv run`).
pub fn format_extract_summary(run: &ExtractRun) -> String {
    let mut out = String::new();

    out.push_str("=== curv - Strong Curvature Extraction ===\n");
    out.push_str(&format!(
        "Input: {} lines | {} records | {} malformed\n",
        run.batch.lines_read,
        run.batch.records.len(),
        run.batch.line_errors.len()
    ));
    if run.mirror_seen {
        out.push_str("Input mirror: present (informational only)\n");
    }
    out.push_str(&format!(
        "Solver runs: {} ok | {} failed\n",
        run.outcome.diagnostics.len(),
        run.outcome.failures.len()
    ));

    out
}

/// Summary for `curv timeline` (and the detection half of `curv run`).
pub fn format_timeline_summary(
    records_used: usize,
    skipped_lines: usize,
    timeline: &Timeline,
    thresholds: &Thresholds,
) -> String {
    let mut out = String::new();

    out.push_str("=== curv - Event Timeline ===\n");
    out.push_str(&format!(
        "Diagnostics: {records_used} records | {skipped_lines} malformed\n"
    ));
    out.push_str(&format!(
        "Thresholds: max_R > {} | violation > {}\n",
        thresholds.curvature, thresholds.violation
    ));

    let violations = count_kind(timeline, EventKind::ConstraintViolation);
    let peaks = count_kind(timeline, EventKind::CurvaturePeak);
    out.push_str(&format!(
        "Events: {} total | constraint_violation={violations} | curvature_peak={peaks}\n",
        timeline.len()
    ));

    if let (Some(first), Some(last)) = (timeline.events().first(), timeline.events().last()) {
        out.push_str(&format!("Time span: [{}, {}]\n", first.time, last.time));
    }

    out
}

/// Render every recovered failure for stderr, or `None` when the batch was
/// clean. Silent data loss is the defect this report exists to prevent.
pub fn format_failure_report(
    line_errors: &[LineError],
    failures: &[ExtractionFailure],
) -> Option<String> {
    if line_errors.is_empty() && failures.is_empty() {
        return None;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Recovered failures ({} input lines, {} solver runs); batch continued:\n",
        line_errors.len(),
        failures.len()
    ));
    for err in line_errors {
        out.push_str(&format!("  line {}: {}\n", err.line, err.message));
    }
    for failure in failures {
        out.push_str(&format!(
            "  run {{{}}}: {}: {}\n",
            format_params(&failure.record.parameters),
            failure.kind.display_name(),
            failure.message
        ));
    }

    Some(out)
}

fn count_kind(timeline: &Timeline, kind: EventKind) -> usize {
    timeline.events().iter().filter(|e| e.kind == kind).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Event, FailureKind, ParameterMap, ParameterRecord};
    use crate::events::timeline::assemble;

    #[test]
    fn timeline_summary_counts_event_kinds() {
        let events = vec![
            Event {
                kind: EventKind::ConstraintViolation,
                time: 0.1,
                params: ParameterMap::new(),
                magnitude: 2e-6,
            },
            Event {
                kind: EventKind::CurvaturePeak,
                time: 0.4,
                params: ParameterMap::new(),
                magnitude: 0.2,
            },
        ];
        let timeline = assemble(&[events]);

        let summary = format_timeline_summary(3, 1, &timeline, &Thresholds::default());
        assert!(summary.contains("3 records | 1 malformed"));
        assert!(summary.contains("constraint_violation=1"));
        assert!(summary.contains("curvature_peak=1"));
        assert!(summary.contains("Time span: [0.1, 0.4]"));
    }

    #[test]
    fn failure_report_lists_every_recovered_failure() {
        let line_errors = vec![LineError {
            line: 4,
            message: "not valid JSON: expected value".to_string(),
        }];
        let failures = vec![ExtractionFailure {
            kind: FailureKind::ProcessError,
            message: "solver timed out after 60.0s".to_string(),
            record: ParameterRecord::from_parameters(ParameterMap::from([(
                "grid".to_string(),
                128.0,
            )])),
        }];

        let report = format_failure_report(&line_errors, &failures).unwrap();
        assert!(report.contains("line 4: not valid JSON"));
        assert!(report.contains("run {grid=128}: process error: solver timed out"));
    }

    #[test]
    fn clean_batch_produces_no_failure_report() {
        assert!(format_failure_report(&[], &[]).is_none());
    }
}
