//! NDJSON ingest and validation.
//!
//! This module turns the upstream convergence file (and the intermediate
//! diagnostics file) into clean record sequences that are safe to process.
//!
//! Design goals:
//! - **Line-level validation** (skip bad lines, but report what happened)
//! - **Deterministic behavior** (input order preserved, no hidden state)
//! - **Separation of concerns**: no extraction or detection logic here
//!
//! Only a file that cannot be opened or read at all is an error; a malformed
//! line degrades to a [`LineError`] and the rest of the batch proceeds.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::domain::{DiagnosticRecord, ParameterMap, ParameterRecord};
use crate::error::AppError;

/// A line-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct LineError {
    /// 1-based line number in the input file.
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated records + line errors + how many non-blank lines
/// were read.
#[derive(Debug, Clone)]
pub struct IngestedBatch<T> {
    pub records: Vec<T>,
    pub line_errors: Vec<LineError>,
    pub lines_read: usize,
}

/// Load parameter records from an NDJSON convergence file.
pub fn load_parameter_records(path: &Path) -> Result<IngestedBatch<ParameterRecord>, AppError> {
    load_ndjson(path, parse_parameter_line)
}

/// Load diagnostic records from an NDJSON diagnostics file.
pub fn load_diagnostic_records(path: &Path) -> Result<IngestedBatch<DiagnosticRecord>, AppError> {
    load_ndjson(path, parse_diagnostic_line)
}

/// Read the optional AsciiMath mirror of an input file.
///
/// The mirror duplicates NDJSON content for human inspection and carries no
/// logic-relevant data; it is read only so the run summary can note its
/// presence.
pub fn load_summary_mirror(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

fn load_ndjson<T>(
    path: &Path,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<IngestedBatch<T>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input '{}': {e}", path.display())))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    let mut line_errors = Vec::new();
    let mut lines_read = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.map_err(|e| {
            AppError::new(2, format!("Failed to read input '{}': {e}", path.display()))
        })?;
        if line.trim().is_empty() {
            continue;
        }
        lines_read += 1;

        match parse(&line) {
            Ok(record) => records.push(record),
            Err(message) => line_errors.push(LineError {
                line: line_number,
                message,
            }),
        }
    }

    Ok(IngestedBatch {
        records,
        line_errors,
        lines_read,
    })
}

/// Parse one convergence line.
///
/// The canonical shape is `{"parameters": {...}, "L2_error"?, ...}`; a bare
/// all-numeric mapping is also accepted as the parameter mapping itself
/// (older convergence files use that shape).
fn parse_parameter_line(line: &str) -> Result<ParameterRecord, String> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| format!("not valid JSON: {e}"))?;

    let Some(object) = value.as_object() else {
        return Err("expected a JSON object".to_string());
    };

    if object.contains_key("parameters") {
        return serde_json::from_value(value.clone())
            .map_err(|e| format!("invalid parameter record: {e}"));
    }

    // Bare-mapping fallback: the whole object is the parameter mapping.
    let mut parameters = ParameterMap::new();
    for (key, value) in object {
        let Some(number) = value.as_f64() else {
            return Err(format!("parameter '{key}' is not numeric"));
        };
        parameters.insert(key.clone(), number);
    }
    if parameters.is_empty() {
        return Err("empty parameter mapping".to_string());
    }
    Ok(ParameterRecord::from_parameters(parameters))
}

fn parse_diagnostic_line(line: &str) -> Result<DiagnosticRecord, String> {
    let diag: DiagnosticRecord =
        serde_json::from_str(line).map_err(|e| format!("invalid diagnostic record: {e}"))?;

    // The extraction stage guarantees this; re-validate because diagnostics
    // files can also arrive from elsewhere.
    let mut prev_time = f64::NEG_INFINITY;
    for &(time, _) in &diag.violations {
        if time < prev_time {
            return Err(format!(
                "violation times not ascending ({time} after {prev_time})"
            ));
        }
        prev_time = time;
    }

    Ok(diag)
}
