//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed through the extraction pipeline in-memory
//! - written to / reloaded from NDJSON between the two pipeline stages
//! - asserted on directly in tests

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named numeric simulation parameters (e.g. grid resolution, spatial step,
/// time step).
///
/// A `BTreeMap` keeps serialization order deterministic, which matters for
/// reproducible NDJSON and AsciiMath output.
pub type ParameterMap = BTreeMap<String, f64>;

/// One validated simulation parameter set, as produced by the upstream
/// convergence study.
///
/// Immutable input: identity is the parameter mapping itself, and the position
/// in the input sequence is preserved through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub parameters: ParameterMap,

    /// Convergence-quality fields. Optional: older convergence files omit them.
    #[serde(rename = "L2_error", skip_serializing_if = "Option::is_none")]
    pub l2_error: Option<f64>,
    #[serde(rename = "Linf_error", skip_serializing_if = "Option::is_none")]
    pub linf_error: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl ParameterRecord {
    /// Build a record from a bare parameter mapping (no quality fields).
    pub fn from_parameters(parameters: ParameterMap) -> Self {
        Self {
            parameters,
            l2_error: None,
            linf_error: None,
            order: None,
        }
    }
}

/// Curvature diagnostics for one successfully processed parameter set.
///
/// Only created when the solver run succeeded and its output validated; a
/// failed extraction is recorded as an [`ExtractionFailure`] instead, never as
/// a zero-valued diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    /// The originating parameter set (flattened into the NDJSON line).
    #[serde(flatten)]
    pub record: ParameterRecord,

    /// Peak Ricci-scalar value across the run. ≥ 0 by physical convention,
    /// but not enforced here.
    #[serde(rename = "max_R")]
    pub max_r: f64,

    /// Peak Ricci-tensor-contraction value.
    #[serde(rename = "peak_R2")]
    pub peak_r2: f64,

    /// Time of the Ricci-scalar peak, when the solver reports one.
    ///
    /// Optional at the solver contract level; the detector falls back to a
    /// documented convention over the violation series when this is absent.
    #[serde(rename = "max_R_time", skip_serializing_if = "Option::is_none")]
    pub max_r_time: Option<f64>,

    /// Constraint-violation series as `(time, magnitude)` pairs, time
    /// non-decreasing (validated at the solver boundary).
    pub violations: Vec<(f64, f64)>,
}

/// Why an extraction failed for one parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The solver process could not be started, exited non-zero, or exceeded
    /// the invocation timeout.
    ProcessError,
    /// The solver exited successfully but its stdout was not a valid
    /// diagnostic object.
    MalformedOutput,
}

impl FailureKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            FailureKind::ProcessError => "process error",
            FailureKind::MalformedOutput => "malformed output",
        }
    }
}

/// A per-record extraction failure. Never silently dropped: failures are
/// reported alongside normal output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub kind: FailureKind,
    pub message: String,
    /// The failing record (flattened, so a failure report line carries the
    /// same `parameters` shape as input lines).
    #[serde(flatten)]
    pub record: ParameterRecord,
}

/// Detected event kind.
///
/// The declared merge priority at equal times is `ConstraintViolation` before
/// `CurvaturePeak`; see [`crate::events::timeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ConstraintViolation,
    CurvaturePeak,
}

impl EventKind {
    /// Merge priority at equal event times (lower sorts first).
    pub fn merge_priority(self) -> u8 {
        match self {
            EventKind::ConstraintViolation => 0,
            EventKind::CurvaturePeak => 1,
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            EventKind::ConstraintViolation => "constraint_violation",
            EventKind::CurvaturePeak => "curvature_peak",
        }
    }
}

/// A detected, time-stamped occurrence derived from one diagnostic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "event")]
    pub kind: EventKind,
    pub time: f64,
    /// Originating parameter mapping.
    pub params: ParameterMap,
    /// The value that triggered the event: `max_R` for curvature peaks, the
    /// violation magnitude for constraint violations.
    pub magnitude: f64,
}

/// The chronologically ordered merge of all events across a batch.
///
/// Immutable once assembled: storage is private and only read accessors are
/// exposed. A new `Timeline` must be built from scratch to reflect new input.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    events: Vec<Event>,
}

impl Timeline {
    /// Wrap an already-sorted event sequence. Only the assembler constructs
    /// timelines; see [`crate::events::timeline::assemble`].
    pub(crate) fn from_sorted(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Default curvature-peak threshold on `max_R` (strong-field screen).
pub const DEFAULT_CURVATURE_THRESHOLD: f64 = 0.1;

/// Default constraint-violation threshold, on the order of the numerical
/// noise floor of double-precision residuals.
pub const DEFAULT_VIOLATION_THRESHOLD: f64 = 1e-6;

/// Detection thresholds. First-class configuration, never embedded constants:
/// both arrive from CLI flags (or these documented defaults).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// A `curvature_peak` event fires when `max_R` is strictly above this.
    pub curvature: f64,
    /// A `constraint_violation` event fires for each violation sample whose
    /// magnitude is strictly above this.
    pub violation: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            curvature: DEFAULT_CURVATURE_THRESHOLD,
            violation: DEFAULT_VIOLATION_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_record_round_trips_flattened_parameters() {
        let line = r#"{"parameters":{"grid":128.0,"dr":0.01},"L2_error":0.002,"max_R":0.123,"peak_R2":0.000456,"violations":[[0.0,1e-7],[0.1,2e-7]]}"#;
        let diag: DiagnosticRecord = serde_json::from_str(line).unwrap();

        assert_eq!(diag.record.parameters.get("grid"), Some(&128.0));
        assert_eq!(diag.record.l2_error, Some(0.002));
        assert_eq!(diag.max_r, 0.123);
        assert_eq!(diag.max_r_time, None);
        assert_eq!(diag.violations, vec![(0.0, 1e-7), (0.1, 2e-7)]);

        let back = serde_json::to_value(&diag).unwrap();
        assert_eq!(back["parameters"]["grid"], 128.0);
        assert_eq!(back["max_R"], 0.123);
        // Absent optional fields stay absent in output lines.
        assert!(back.get("max_R_time").is_none());
        assert!(back.get("Linf_error").is_none());
    }

    #[test]
    fn event_serializes_with_contract_field_names() {
        let event = Event {
            kind: EventKind::ConstraintViolation,
            time: 0.1,
            params: ParameterMap::from([("grid".to_string(), 128.0)]),
            magnitude: 2e-6,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "constraint_violation");
        assert_eq!(value["time"], 0.1);
        assert_eq!(value["params"]["grid"], 128.0);
        assert_eq!(value["magnitude"], 2e-6);
    }

    #[test]
    fn constraint_violation_sorts_before_curvature_peak() {
        assert!(
            EventKind::ConstraintViolation.merge_priority()
                < EventKind::CurvaturePeak.merge_priority()
        );
    }
}
