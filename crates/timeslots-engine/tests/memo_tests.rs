//! Tests for FIFO memoization, standalone and through the calendar.

use chrono::NaiveDate;
use timeslots_engine::{Calendar, Interval, MemoCache};

#[test]
fn zero_capacity_disables_cache() {
    let mut cache: MemoCache<u32, &str> = MemoCache::new(0);
    cache.put(1, "one");
    assert_eq!(cache.get(&1), None);
    assert!(cache.is_empty());
}

#[test]
fn oldest_inserted_entry_is_evicted() {
    let mut cache = MemoCache::new(2);
    cache.put("a", 1);
    cache.put("b", 2);
    // Reading "a" does not refresh it: eviction is by insertion order.
    assert_eq!(cache.get(&"a"), Some(1));
    cache.put("c", 3);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&"a"), None);
    assert_eq!(cache.get(&"b"), Some(2));
    assert_eq!(cache.get(&"c"), Some(3));
}

#[test]
fn reinsert_replaces_value_without_growing() {
    let mut cache = MemoCache::new(2);
    cache.put("a", 1);
    cache.put("a", 10);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&"a"), Some(10));
}

#[test]
fn shrinking_capacity_evicts_oldest() {
    let mut cache = MemoCache::new(3);
    cache.put(1, 'x');
    cache.put(2, 'y');
    cache.put(3, 'z');
    cache.set_capacity(1);
    assert_eq!(cache.len(), 1);
    assert!(cache.contains(&3));
    assert!(!cache.contains(&1));
}

#[test]
fn keys_are_order_sensitive() {
    let mut cache = MemoCache::new(4);
    cache.put(vec![Interval::new(0, 10), Interval::new(20, 30)], "sorted");
    assert_eq!(
        cache.get(&vec![Interval::new(20, 30), Interval::new(0, 10)]),
        None
    );
}

// ── Through the calendar ────────────────────────────────────────────────────

fn scenario_calendar(cache_size: usize) -> Calendar {
    let mut calendar = Calendar::new();
    calendar.set_cache_size(cache_size);
    calendar
        .add_open_rules(["p=600-700", "p=800-900", "p=540-600;wd=1"])
        .unwrap();
    calendar
        .add_close_rules(["p=650-850", "p=1000-1100", "p=0-1440;sd=easter"])
        .unwrap();
    calendar
}

#[test]
fn results_are_identical_with_and_without_cache() {
    let start = NaiveDate::from_ymd_opt(2014, 4, 1).unwrap();
    for cache_size in [1, 2, 5, 100] {
        let mut plain = scenario_calendar(0);
        let mut cached = scenario_calendar(cache_size);
        for day in start.iter_days().take(45) {
            assert_eq!(
                plain.get_periods_of_day(day),
                cached.get_periods_of_day(day),
                "day {} cache {}",
                day,
                cache_size
            );
            assert_eq!(
                plain.get_time_slots_of_day(day),
                cached.get_time_slots_of_day(day),
                "day {} cache {}",
                day,
                cache_size
            );
        }
    }
}

#[test]
fn calendar_caches_stay_within_capacity() {
    let mut calendar = scenario_calendar(2);
    let start = NaiveDate::from_ymd_opt(2014, 4, 1).unwrap();
    for day in start.iter_days().take(30) {
        calendar.get_time_slots_of_day(day);
    }
    let (reduce, subtract, slice) = calendar.cache_lens();
    assert!(reduce <= 2 && subtract <= 2 && slice <= 2);
    assert!(subtract > 0);
}

#[test]
fn disabled_calendar_cache_stays_empty() {
    let mut calendar = scenario_calendar(0);
    calendar.get_time_slots_of_day(NaiveDate::from_ymd_opt(2014, 4, 1).unwrap());
    assert_eq!(calendar.cache_lens(), (0, 0, 0));
}

#[test]
fn rule_change_clears_caches() {
    let mut calendar = scenario_calendar(10);
    calendar.get_time_slots_of_day(NaiveDate::from_ymd_opt(2014, 4, 1).unwrap());
    assert_ne!(calendar.cache_lens(), (0, 0, 0));

    calendar.add_open_rules(["p=1200-1300"]).unwrap();
    assert_eq!(calendar.cache_lens(), (0, 0, 0));
}

#[test]
fn evicted_entry_is_recomputed_not_stale() {
    let mut calendar = Calendar::new();
    calendar.set_cache_size(1);
    let first = [Interval::new(600, 700)];
    let second = [Interval::new(800, 900)];

    let a = calendar.get_time_slots_of_day_periods(&first);
    calendar.get_time_slots_of_day_periods(&second);
    // `first` has been evicted; recomputing must give the same answer.
    assert_eq!(calendar.get_time_slots_of_day_periods(&first), a);
    assert_eq!(calendar.cache_lens().2, 1);
}
