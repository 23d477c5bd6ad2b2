//! Chronological timeline assembly.
//!
//! Unordered merges of equal-time events are a classic source of
//! non-reproducible output, so the ordering is fully declared:
//!
//! 1. event time, ascending
//! 2. originating-record input order (position of the event's source list)
//! 3. event kind: `constraint_violation` before `curvature_peak`

use crate::domain::{Event, Timeline};

/// Merge per-record event lists into one ordered timeline.
///
/// The position of each list in `event_lists` is the originating record's
/// input order, used as the first tie-break at equal times. The result is
/// total and final: a new timeline must be assembled from scratch to reflect
/// new input.
pub fn assemble(event_lists: &[Vec<Event>]) -> Timeline {
    let mut flat: Vec<(usize, Event)> = event_lists
        .iter()
        .enumerate()
        .flat_map(|(source, list)| list.iter().cloned().map(move |event| (source, event)))
        .collect();

    flat.sort_by(|(a_source, a), (b_source, b)| {
        a.time
            .total_cmp(&b.time)
            .then_with(|| a_source.cmp(b_source))
            .then_with(|| a.kind.merge_priority().cmp(&b.kind.merge_priority()))
    });

    Timeline::from_sorted(flat.into_iter().map(|(_, event)| event).collect())
}
