//! Property-based tests for the interval algebra using proptest.
//!
//! These check invariants that hold for *any* interval list, not just the
//! fixed cases in `interval_tests.rs` and `slot_tests.rs`.

use chrono::NaiveDate;
use proptest::prelude::*;
use timeslots_engine::{reduce, slice, subtract, Calendar, Interval, SlotGrid, MINUTES_PER_DAY};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Intervals that may stick out of the day on either side.
fn arb_interval() -> impl Strategy<Value = Interval> {
    (-120i32..1560, 1i32..600).prop_map(|(begin, len)| Interval::new(begin, begin + len))
}

fn arb_intervals() -> impl Strategy<Value = Vec<Interval>> {
    prop::collection::vec(arb_interval(), 0..12)
}

/// A rule string with one or two in-day periods.
fn arb_period_rule() -> impl Strategy<Value = String> {
    prop::collection::vec((0i32..1380, 1i32..240), 1..3).prop_map(|periods| {
        let values: Vec<String> = periods
            .into_iter()
            .map(|(begin, len)| format!("{}-{}", begin, (begin + len).min(MINUTES_PER_DAY)))
            .collect();
        format!("p={}", values.join(","))
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn covers(intervals: &[Interval], minute: i32) -> bool {
    intervals
        .iter()
        .any(|iv| iv.begin <= minute && minute < iv.end)
}

proptest! {
    #[test]
    fn reduce_is_sorted_disjoint_and_clamped(intervals in arb_intervals()) {
        let reduced = reduce(&intervals);
        for iv in &reduced {
            prop_assert!(iv.begin >= 0 && iv.end <= MINUTES_PER_DAY);
            prop_assert!(iv.begin < iv.end);
        }
        for pair in reduced.windows(2) {
            prop_assert!(pair[0].end < pair[1].begin, "{:?} touches {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn reduce_is_idempotent(intervals in arb_intervals()) {
        let once = reduce(&intervals);
        prop_assert_eq!(reduce(&once), once);
    }

    #[test]
    fn reduce_preserves_covered_minutes(intervals in arb_intervals()) {
        let reduced = reduce(&intervals);
        for minute in (0..MINUTES_PER_DAY).step_by(7) {
            prop_assert_eq!(covers(&intervals, minute), covers(&reduced, minute));
        }
    }

    #[test]
    fn subtract_nothing_is_reduce(open in arb_intervals()) {
        prop_assert_eq!(subtract(&open, &[]), reduce(&open));
    }

    #[test]
    fn subtract_whole_day_is_empty(open in arb_intervals()) {
        prop_assert!(subtract(&open, &[Interval::new(0, MINUTES_PER_DAY)]).is_empty());
    }

    #[test]
    fn subtract_self_is_empty(open in arb_intervals()) {
        prop_assert!(subtract(&open, &open).is_empty());
    }

    #[test]
    fn subtract_is_set_difference(open in arb_intervals(), close in arb_intervals()) {
        let open_r = reduce(&open);
        let close_r = reduce(&close);
        let result = subtract(&open, &close);
        for minute in 0..MINUTES_PER_DAY {
            let expected = covers(&open_r, minute) && !covers(&close_r, minute);
            prop_assert_eq!(covers(&result, minute), expected, "minute {}", minute);
        }
        for pair in result.windows(2) {
            prop_assert!(pair[0].begin <= pair[1].begin);
        }
    }

    #[test]
    fn slice_slots_fit_their_period(
        intervals in arb_intervals(),
        granularity in 1u32..=120,
        midnight_alignment in any::<bool>(),
    ) {
        let periods = reduce(&intervals);
        let grid = SlotGrid { granularity, midnight_alignment };
        let width = granularity as i32;
        for slot in slice(&periods, grid) {
            prop_assert_eq!(slot.end - slot.begin, width);
            prop_assert!(periods.iter().any(|p| p.begin <= slot.begin && slot.end <= p.end));
            if midnight_alignment {
                prop_assert_eq!(slot.begin % width, 0);
            }
        }
    }

    #[test]
    fn cache_size_never_changes_results(
        open in prop::collection::vec(arb_period_rule(), 1..4),
        close in prop::collection::vec(arb_period_rule(), 0..3),
        cache_size in 1usize..4,
    ) {
        let mut plain = Calendar::new();
        plain.add_open_rules(&open).unwrap();
        plain.add_close_rules(&close).unwrap();

        let mut cached = plain.clone();
        cached.set_cache_size(cache_size);

        let start = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        for day in start.iter_days().take(5) {
            prop_assert_eq!(plain.get_periods_of_day(day), cached.get_periods_of_day(day));
            prop_assert_eq!(plain.get_time_slots_of_day(day), cached.get_time_slots_of_day(day));
        }
    }
}
