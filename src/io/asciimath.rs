//! AsciiMath summary rendering.
//!
//! The `.am` files are human-inspection mirrors of the NDJSON outputs. They
//! carry no logic-relevant data, so everything here is pure serialization:
//! deterministic text from already-computed records.

use std::fs;
use std::path::Path;

use crate::domain::{DiagnosticRecord, ParameterMap, Timeline};
use crate::error::AppError;

/// Render the diagnostics summary, one `run:` line per record.
pub fn render_diagnostics(diagnostics: &[DiagnosticRecord]) -> String {
    let mut lines = Vec::with_capacity(diagnostics.len());
    for diag in diagnostics {
        let mut specs = format_params(&diag.record.parameters);
        if let Some(l2) = diag.record.l2_error {
            specs.push_str(&format!(", L2_error={l2}"));
        }
        if let Some(linf) = diag.record.linf_error {
            specs.push_str(&format!(", Linf_error={linf}"));
        }
        if let Some(order) = diag.record.order {
            specs.push_str(&format!(", order={order}"));
        }
        lines.push(format!(
            "run: {specs}, max_R: {}, peak_R2: {}",
            diag.max_r, diag.peak_r2
        ));
    }
    lines.join("\n")
}

/// Render the timeline summary as a `timeline:` bullet list.
pub fn render_timeline(timeline: &Timeline) -> String {
    let mut lines = vec!["timeline:".to_string()];
    for event in timeline.events() {
        lines.push(format!(
            "- at t={}: {} for params {{{}}}",
            event.time,
            event.kind.display_name(),
            format_params(&event.params),
        ));
    }
    lines.join("\n")
}

/// Write rendered AsciiMath text, with a trailing newline.
pub fn write_asciimath(path: &Path, text: &str) -> Result<(), AppError> {
    fs::write(path, format!("{text}\n")).map_err(|e| {
        AppError::new(
            3,
            format!("Failed to write AsciiMath summary '{}': {e}", path.display()),
        )
    })
}

/// Render a parameter mapping as `key=value, ...` (deterministic: the map is
/// ordered). Shared with the failure report.
pub fn format_params(params: &ParameterMap) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Event, EventKind, ParameterRecord};
    use crate::events::timeline::assemble;

    #[test]
    fn diagnostics_render_one_run_line_per_record() {
        let mut record = ParameterRecord::from_parameters(ParameterMap::from([
            ("dr".to_string(), 0.01),
            ("grid".to_string(), 128.0),
        ]));
        record.l2_error = Some(0.002);

        let diag = DiagnosticRecord {
            record,
            max_r: 0.123,
            peak_r2: 0.000456,
            max_r_time: None,
            violations: vec![(0.0, 1e-7)],
        };

        let text = render_diagnostics(&[diag]);
        assert_eq!(
            text,
            "run: dr=0.01, grid=128, L2_error=0.002, max_R: 0.123, peak_R2: 0.000456"
        );
    }

    #[test]
    fn timeline_renders_bullets_in_order() {
        let events = vec![
            Event {
                kind: EventKind::ConstraintViolation,
                time: 0.1,
                params: ParameterMap::from([("grid".to_string(), 128.0)]),
                magnitude: 2e-6,
            },
            Event {
                kind: EventKind::CurvaturePeak,
                time: 0.4,
                params: ParameterMap::from([("grid".to_string(), 128.0)]),
                magnitude: 0.123,
            },
        ];
        let timeline = assemble(&[events]);

        let text = render_timeline(&timeline);
        assert_eq!(
            text,
            "timeline:\n\
             - at t=0.1: constraint_violation for params {grid=128}\n\
             - at t=0.4: curvature_peak for params {grid=128}"
        );
    }

    #[test]
    fn empty_timeline_still_renders_the_header() {
        assert_eq!(render_timeline(&assemble(&[])), "timeline:");
    }
}
