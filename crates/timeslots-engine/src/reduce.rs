//! Normalize interval lists into a minimal sorted cover.

use crate::interval::Interval;

/// Merge `intervals` into a sorted, non-overlapping list.
///
/// Bounds are clamped into `[0, 1440]` first; intervals left empty by the
/// clamp (or inverted on input) are dropped. Touching intervals are merged,
/// so no two outputs satisfy `a.end >= b.begin`.
pub fn reduce(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals
        .iter()
        .map(Interval::clamped)
        .filter(Interval::is_valid)
        .collect();

    if sorted.is_empty() {
        return sorted;
    }

    sorted.sort_by_key(|interval| interval.begin);

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for current in sorted {
        if let Some(reference) = merged.last_mut() {
            if current.begin <= reference.end && current.end > reference.end {
                reference.end = current.end;
                continue;
            }
            if current.begin >= reference.begin && current.end <= reference.end {
                continue;
            }
        }
        merged.push(current);
    }

    merged
}
