//! Minute-of-day intervals and ordered per-day result maps.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Number of minutes in a day; the upper bound of every reduced interval.
pub const MINUTES_PER_DAY: i32 = 1440;

/// A half-open `[begin, end)` span of minutes within a single day.
///
/// Bounds are not validated on construction. Values outside `[0, 1440]` are
/// clamped by [`crate::reduce::reduce`], and an interval with `begin >= end`
/// yields no slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub begin: i32,
    pub end: i32,
}

impl Interval {
    pub const fn new(begin: i32, end: i32) -> Self {
        Self { begin, end }
    }

    /// Length in minutes (zero for empty or inverted intervals).
    pub fn duration_minutes(&self) -> i32 {
        (self.end - self.begin).max(0)
    }

    pub fn is_valid(&self) -> bool {
        self.begin < self.end
    }

    pub(crate) fn clamped(&self) -> Self {
        Self {
            begin: self.begin.clamp(0, MINUTES_PER_DAY),
            end: self.end.clamp(0, MINUTES_PER_DAY),
        }
    }
}

impl From<(i32, i32)> for Interval {
    fn from((begin, end): (i32, i32)) -> Self {
        Self { begin, end }
    }
}

/// Convert an untyped JSON array of `{"begin": .., "end": ..}` objects into
/// intervals.
///
/// Entries whose `begin` or `end` is missing or not an integer are skipped
/// without error, as is anything that is not an array.
pub fn periods_from_json(value: &serde_json::Value) -> Vec<Interval> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let begin = item.get("begin")?.as_i64()?;
            let end = item.get("end")?.as_i64()?;
            Some(Interval {
                begin: i32::try_from(begin).ok()?,
                end: i32::try_from(end).ok()?,
            })
        })
        .collect()
}

/// Per-day results keyed by formatted date, in chronological order.
///
/// Keys follow the calendar's date format, which need not sort
/// chronologically, so insertion order is kept instead of a sorted map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> DayMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert `value` under `key`. A key already present keeps its position
    /// and takes the new value.
    pub(crate) fn push(&mut self, key: String, value: T) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<T> Default for DayMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for DayMap<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T: Serialize> Serialize for DayMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
