//! Remove closed intervals from open intervals.
//!
//! Both sides are reduced first. Each close interval is then applied in turn
//! to the open intervals that survived the previous ones, trimming the left
//! or right edge, splitting an interval in two, or removing it outright.
//! A close interval that merely touches an open edge (`close.end == open.begin`
//! or `close.begin == open.end`) leaves it untouched.

use crate::interval::Interval;
use crate::reduce::reduce;

/// `open` minus `close`, sorted by begin.
///
/// A close interval sharing an edge with an open one (same begin, same end, or
/// both) trims or removes it, so a close that covers an open exactly leaves
/// nothing behind.
pub fn subtract(open: &[Interval], close: &[Interval]) -> Vec<Interval> {
    subtract_reduced(reduce(open), &reduce(close))
}

/// [`subtract`] for inputs that are already reduced.
pub(crate) fn subtract_reduced(mut open: Vec<Interval>, close: &[Interval]) -> Vec<Interval> {
    for cut in close {
        open = open
            .into_iter()
            .flat_map(|interval| remainder(interval, *cut))
            .flatten()
            .collect();
    }

    open.sort_by_key(|interval| interval.begin);
    open
}

/// What is left of `open` after removing `close`: up to a left and a right
/// piece.
fn remainder(open: Interval, close: Interval) -> [Option<Interval>; 2] {
    let overlaps = close.begin < open.end && close.end > open.begin;
    if !overlaps {
        return [Some(open), None];
    }

    let left = (close.begin > open.begin).then_some(Interval {
        begin: open.begin,
        end: close.begin,
    });
    let right = (close.end < open.end).then_some(Interval {
        begin: close.end,
        end: open.end,
    });
    [left, right]
}
