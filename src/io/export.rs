//! NDJSON exports.
//!
//! One JSON object per line, matching the ingest schemas, so downstream
//! tools (and this tool's own `timeline` stage) can stream the files back in.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{DiagnosticRecord, ExtractionFailure, Timeline};
use crate::error::AppError;

/// Write one diagnostic record per line.
pub fn write_diagnostics_ndjson(
    path: &Path,
    diagnostics: &[DiagnosticRecord],
) -> Result<(), AppError> {
    write_ndjson(path, "diagnostics output", diagnostics)
}

/// Write one event per line, in timeline order.
pub fn write_timeline_ndjson(path: &Path, timeline: &Timeline) -> Result<(), AppError> {
    write_ndjson(path, "timeline output", timeline.events())
}

/// Write one extraction failure per line.
///
/// This is the machine-readable side of the failure report; the terminal
/// summary is the human-readable side. Failures are never only in one place.
pub fn write_failures_ndjson(path: &Path, failures: &[ExtractionFailure]) -> Result<(), AppError> {
    write_ndjson(path, "failure report", failures)
}

fn write_ndjson<'a, T: Serialize + 'a>(
    path: &Path,
    label: &str,
    items: impl IntoIterator<Item = &'a T>,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(3, format!("Failed to create {label} '{}': {e}", path.display()))
    })?;
    let mut writer = BufWriter::new(file);

    for item in items {
        let line = serde_json::to_string(item)
            .map_err(|e| AppError::new(3, format!("Failed to encode {label} line: {e}")))?;
        writeln!(writer, "{line}").map_err(|e| {
            AppError::new(3, format!("Failed to write {label} '{}': {e}", path.display()))
        })?;
    }

    writer.flush().map_err(|e| {
        AppError::new(3, format!("Failed to write {label} '{}': {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailureKind, ParameterMap, ParameterRecord};
    use crate::io::ingest::load_diagnostic_records;

    fn diagnostic(grid: f64) -> DiagnosticRecord {
        DiagnosticRecord {
            record: ParameterRecord::from_parameters(ParameterMap::from([(
                "grid".to_string(),
                grid,
            )])),
            max_r: 0.123,
            peak_r2: 0.000456,
            max_r_time: None,
            violations: vec![(0.0, 1e-7), (0.1, 2e-7)],
        }
    }

    #[test]
    fn diagnostics_round_trip_through_ndjson() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strong_curvature.ndjson");
        let diagnostics = vec![diagnostic(128.0), diagnostic(256.0)];

        write_diagnostics_ndjson(&path, &diagnostics).unwrap();
        let batch = load_diagnostic_records(&path).unwrap();

        assert!(batch.line_errors.is_empty());
        assert_eq!(batch.records, diagnostics);
    }

    #[test]
    fn failure_lines_carry_kind_message_and_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.ndjson");
        let failures = vec![ExtractionFailure {
            kind: FailureKind::ProcessError,
            message: "solver exited with exit status: 3".to_string(),
            record: ParameterRecord::from_parameters(ParameterMap::from([(
                "grid".to_string(),
                128.0,
            )])),
        }];

        write_failures_ndjson(&path, &failures).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();

        assert_eq!(value["kind"], "process_error");
        assert_eq!(value["parameters"]["grid"], 128.0);
        assert!(value["message"].as_str().unwrap().contains("exit status"));
    }

    #[test]
    fn unwritable_output_path_is_a_write_error() {
        let err =
            write_diagnostics_ndjson(Path::new("/nonexistent/dir/out.ndjson"), &[]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
