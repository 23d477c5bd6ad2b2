//! Threshold-driven event detection.
//!
//! Detection is a pure function of `(diagnostic, thresholds)`: no side
//! effects, identical inputs always yield identical event sequences.

use crate::domain::{DiagnosticRecord, Event, EventKind, Thresholds};

/// Scan one diagnostic record against the thresholds.
///
/// Two independent, non-exclusive rules, both with strict `>` comparisons:
///
/// - one `constraint_violation` event per violation sample whose magnitude
///   exceeds `thresholds.violation` (a magnitude exactly equal to the
///   threshold does not trigger)
/// - one `curvature_peak` event when `max_R` exceeds `thresholds.curvature`,
///   time-stamped per [`peak_time`]
///
/// A single diagnostic can therefore yield both kinds, several constraint
/// violations, or nothing at all.
pub fn detect(diagnostic: &DiagnosticRecord, thresholds: &Thresholds) -> Vec<Event> {
    let mut events = Vec::new();

    for &(time, magnitude) in &diagnostic.violations {
        if magnitude > thresholds.violation {
            events.push(Event {
                kind: EventKind::ConstraintViolation,
                time,
                params: diagnostic.record.parameters.clone(),
                magnitude,
            });
        }
    }

    if diagnostic.max_r > thresholds.curvature {
        events.push(Event {
            kind: EventKind::CurvaturePeak,
            time: peak_time(diagnostic),
            params: diagnostic.record.parameters.clone(),
            magnitude: diagnostic.max_r,
        });
    }

    events
}

/// Time assigned to a curvature-peak event.
///
/// The solver contract only guarantees a scalar `max_R`, so the convention is
/// fixed here once, not patched per call site:
///
/// 1. `max_R_time` from the solver, when reported
/// 2. otherwise the time of the last sample in the longest
///    non-decreasing-magnitude prefix of the violation series (curvature
///    growth tracks constraint drift, so the end of the initial ramp is the
///    best available proxy)
/// 3. `0.0` when there is no violation series at all
pub fn peak_time(diagnostic: &DiagnosticRecord) -> f64 {
    if let Some(t) = diagnostic.max_r_time {
        return t;
    }

    let Some(&(first_time, first_magnitude)) = diagnostic.violations.first() else {
        return 0.0;
    };

    let mut best_time = first_time;
    let mut prev_magnitude = first_magnitude;
    for &(time, magnitude) in &diagnostic.violations[1..] {
        if magnitude < prev_magnitude {
            break;
        }
        best_time = time;
        prev_magnitude = magnitude;
    }
    best_time
}
