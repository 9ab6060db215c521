//! The rule-holding calendar and its day-range queries.
//!
//! A [`Calendar`] owns open and close rules plus configuration, and answers
//! per-day questions lazily: a day's open periods are the union of its active
//! open rules minus the union of its active close rules, computed on first
//! query and kept until rules or configuration change.
//!
//! Queries take `&mut self` because they fill the per-day state and the memo
//! caches. A calendar is therefore single-owner; wrap it in a `Mutex` to share
//! it across threads.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::config::{self, CalendarConfig, RuleFile};
use crate::error::Result;
use crate::interval::{DayMap, Interval, MINUTES_PER_DAY};
use crate::memo::MemoCache;
use crate::predicate::active_intervals;
use crate::reduce::reduce;
use crate::rule::{parse_rule, Rule};
use crate::slots::{slice, SlotGrid};
use crate::subtract::subtract_reduced;

#[derive(Debug, Clone, Default)]
struct DayState {
    periods: Option<Vec<Interval>>,
    time_slots: Option<Vec<Interval>>,
}

#[derive(Debug, Clone)]
pub struct Calendar {
    config: CalendarConfig,
    open_rules: Vec<Rule>,
    close_rules: Vec<Rule>,
    days: HashMap<NaiveDate, DayState>,
    reduce_cache: MemoCache<Vec<Interval>, Vec<Interval>>,
    subtract_cache: MemoCache<(Vec<Interval>, Vec<Interval>), Vec<Interval>>,
    slice_cache: MemoCache<Vec<Interval>, Vec<Interval>>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new()
    }
}

impl Calendar {
    /// An empty calendar with the default configuration: 30-minute slots, no
    /// midnight alignment, memoization disabled, `%Y-%m-%d` day keys.
    pub fn new() -> Self {
        Self::build(CalendarConfig::default())
    }

    /// # Errors
    /// Returns `TimeSlotError::InvalidConfiguration` if `config` fails
    /// [`CalendarConfig::validate`].
    pub fn with_config(config: CalendarConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Build a calendar from a rule file's configuration and rules.
    pub fn from_rule_file(file: &RuleFile) -> Result<Self> {
        let mut calendar = Self::with_config(file.config.clone())?;
        calendar.add_open_rules(&file.open)?;
        calendar.add_close_rules(&file.close)?;
        Ok(calendar)
    }

    fn build(config: CalendarConfig) -> Self {
        let capacity = config.cache_size;
        Self {
            config,
            open_rules: Vec::new(),
            close_rules: Vec::new(),
            days: HashMap::new(),
            reduce_cache: MemoCache::new(capacity),
            subtract_cache: MemoCache::new(capacity),
            slice_cache: MemoCache::new(capacity),
        }
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn open_rules(&self) -> &[Rule] {
        &self.open_rules
    }

    pub fn close_rules(&self) -> &[Rule] {
        &self.close_rules
    }

    // ── Rules ───────────────────────────────────────────────────────────────

    /// Parse and append opening rules.
    ///
    /// The batch is all-or-nothing: if any rule fails to parse, none are added.
    pub fn add_open_rules<I, S>(&mut self, rules: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = parse_all(rules)?;
        tracing::debug!(count = parsed.len(), "open rules added");
        self.open_rules.extend(parsed);
        self.invalidate();
        Ok(self)
    }

    /// Parse and append closing rules. All-or-nothing like
    /// [`Calendar::add_open_rules`].
    pub fn add_close_rules<I, S>(&mut self, rules: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = parse_all(rules)?;
        tracing::debug!(count = parsed.len(), "close rules added");
        self.close_rules.extend(parsed);
        self.invalidate();
        Ok(self)
    }

    pub fn clear_open_rules(&mut self) -> &mut Self {
        self.open_rules.clear();
        self.invalidate();
        self
    }

    pub fn clear_close_rules(&mut self) -> &mut Self {
        self.close_rules.clear();
        self.invalidate();
        self
    }

    pub fn clear_rules(&mut self) -> &mut Self {
        self.open_rules.clear();
        self.close_rules.clear();
        self.invalidate();
        self
    }

    // ── Configuration ───────────────────────────────────────────────────────

    /// # Errors
    /// Returns `TimeSlotError::InvalidConfiguration` unless `minutes` is in
    /// `1..=1440`.
    pub fn set_granularity(&mut self, minutes: u32) -> Result<&mut Self> {
        config::validate_granularity(minutes)?;
        self.config.granularity = minutes;
        self.invalidate();
        Ok(self)
    }

    pub fn set_midnight_alignment(&mut self, enabled: bool) -> &mut Self {
        self.config.midnight_alignment = enabled;
        self.invalidate();
        self
    }

    /// Resize the memo caches. Shrinking evicts the oldest entries; zero
    /// disables memoization and empties the caches.
    pub fn set_cache_size(&mut self, size: usize) -> &mut Self {
        self.config.cache_size = size;
        self.reduce_cache.set_capacity(size);
        self.subtract_cache.set_capacity(size);
        self.slice_cache.set_capacity(size);
        self
    }

    /// # Errors
    /// Returns `TimeSlotError::InvalidConfiguration` for an empty or malformed
    /// strftime format.
    pub fn set_date_format(&mut self, format: impl Into<String>) -> Result<&mut Self> {
        let format = format.into();
        config::validate_date_format(&format)?;
        self.config.date_format = format;
        self.invalidate();
        Ok(self)
    }

    /// Empty the memo caches, keeping rules and per-day state.
    pub fn clear_caches(&mut self) -> &mut Self {
        self.reduce_cache.clear();
        self.subtract_cache.clear();
        self.slice_cache.clear();
        self
    }

    /// Number of memoized entries per operation: `(reduce, subtract, slice)`.
    pub fn cache_lens(&self) -> (usize, usize, usize) {
        (
            self.reduce_cache.len(),
            self.subtract_cache.len(),
            self.slice_cache.len(),
        )
    }

    fn invalidate(&mut self) {
        if !self.days.is_empty() {
            tracing::debug!(days = self.days.len(), "derived day state invalidated");
        }
        self.days.clear();
        self.clear_caches();
    }

    fn grid(&self) -> SlotGrid {
        SlotGrid {
            granularity: self.config.granularity,
            midnight_alignment: self.config.midnight_alignment,
        }
    }

    // ── Single-day queries ──────────────────────────────────────────────────

    /// Open periods of `day`, sorted and non-overlapping.
    pub fn get_periods_of_day(&mut self, day: NaiveDate) -> Vec<Interval> {
        if let Some(periods) = self.days.get(&day).and_then(|s| s.periods.clone()) {
            return periods;
        }

        let periods = self.generate_periods_of_day(day);
        tracing::trace!(%day, periods = periods.len(), "periods of day computed");
        self.days.entry(day).or_default().periods = Some(periods.clone());
        periods
    }

    /// Time slots of `day`'s open periods.
    pub fn get_time_slots_of_day(&mut self, day: NaiveDate) -> Vec<Interval> {
        if let Some(slots) = self.days.get(&day).and_then(|s| s.time_slots.clone()) {
            return slots;
        }

        let periods = self.get_periods_of_day(day);
        let slots = self.slice_cached(&periods);
        self.days.entry(day).or_default().time_slots = Some(slots.clone());
        slots
    }

    /// Slice arbitrary periods into time slots with the current granularity.
    pub fn get_time_slots_of_day_periods(&mut self, periods: &[Interval]) -> Vec<Interval> {
        self.slice_cached(periods)
    }

    /// Time slots of a single period.
    pub fn get_time_slots_of_period(&mut self, period: Interval) -> Vec<Interval> {
        self.slice_cached(&[period])
    }

    fn generate_periods_of_day(&mut self, day: NaiveDate) -> Vec<Interval> {
        let open: Vec<Interval> = self
            .open_rules
            .iter()
            .flat_map(|rule| active_intervals(&day, rule))
            .collect();
        let close: Vec<Interval> = self
            .close_rules
            .iter()
            .flat_map(|rule| active_intervals(&day, rule))
            .collect();

        self.subtract_cached(&open, &close)
    }

    // ── Day-range queries ───────────────────────────────────────────────────

    /// Whether each day of the window has at least one open period.
    ///
    /// Days are chosen as in [`Calendar::get_periods_of_days`].
    pub fn get_days(&mut self, begin: NaiveDateTime, end: NaiveDateTime) -> DayMap<bool> {
        let mut days = DayMap::new();
        for day in window_days(begin, end) {
            let open = !self.get_periods_of_day(day).is_empty();
            days.push(self.day_key(day), open);
        }
        days
    }

    /// Open periods for every day touched by the `[begin, end)` window.
    ///
    /// The first day is `begin`'s date; the last is `end`'s date, or the day
    /// before when `end` is exactly midnight. An empty or inverted window
    /// yields an empty map. When the date format maps several days to one key,
    /// the key keeps its first position and holds the latest day's value.
    ///
    /// With `with_adjustment`, the first day's periods are cut to start no
    /// earlier than `begin`'s time of day and the last day's to end no later
    /// than `end`'s. Periods left empty by the cut are dropped.
    pub fn get_periods_of_days(
        &mut self,
        begin: NaiveDateTime,
        end: NaiveDateTime,
        with_adjustment: bool,
    ) -> DayMap<Vec<Interval>> {
        let window: Vec<NaiveDate> = window_days(begin, end).collect();
        let first = window.first().copied();
        let last = window.last().copied();

        let mut days = DayMap::new();
        for day in window {
            let mut periods = self.get_periods_of_day(day);
            if with_adjustment {
                if Some(day) == first {
                    trim_start(&mut periods, minute_at_or_after(begin.time()));
                }
                if Some(day) == last {
                    let end_minute = if end.time() == NaiveTime::MIN {
                        MINUTES_PER_DAY
                    } else {
                        minute_at_or_before(end.time())
                    };
                    trim_end(&mut periods, end_minute);
                }
            }
            days.push(self.day_key(day), periods);
        }

        days
    }

    /// Time slots for every day touched by the `[begin, end)` window, sliced
    /// from [`Calendar::get_periods_of_days`].
    pub fn get_time_slots_of_days(
        &mut self,
        begin: NaiveDateTime,
        end: NaiveDateTime,
        with_adjustment: bool,
    ) -> DayMap<Vec<Interval>> {
        let periods = self.get_periods_of_days(begin, end, with_adjustment);
        let mut days = DayMap::new();
        for (key, day_periods) in periods {
            let slots = self.slice_cached(&day_periods);
            days.push(key, slots);
        }
        days
    }

    /// Result key of `day`. Formats are checked when set, so the ISO fallback
    /// only covers a format chrono still refuses to render.
    fn day_key(&self, day: NaiveDate) -> String {
        config::render_date(day, &self.config.date_format).unwrap_or_else(|| {
            tracing::warn!(format = %self.config.date_format, %day, "date format failed to render");
            day.to_string()
        })
    }

    // ── Memoized interval operations ────────────────────────────────────────

    fn reduce_cached(&mut self, intervals: &[Interval]) -> Vec<Interval> {
        if self.reduce_cache.capacity() == 0 {
            return reduce(intervals);
        }

        let key = intervals.to_vec();
        if let Some(hit) = self.reduce_cache.get(&key) {
            tracing::trace!(op = "reduce", "memo hit");
            return hit;
        }
        let reduced = reduce(intervals);
        self.reduce_cache.put(key, reduced.clone());
        reduced
    }

    fn subtract_cached(&mut self, open: &[Interval], close: &[Interval]) -> Vec<Interval> {
        let key = (self.subtract_cache.capacity() > 0).then(|| (open.to_vec(), close.to_vec()));
        if let Some(hit) = key.as_ref().and_then(|k| self.subtract_cache.get(k)) {
            tracing::trace!(op = "subtract", "memo hit");
            return hit;
        }

        let open = self.reduce_cached(open);
        let close = self.reduce_cached(close);
        let remaining = subtract_reduced(open, &close);

        if let Some(key) = key {
            self.subtract_cache.put(key, remaining.clone());
        }
        remaining
    }

    fn slice_cached(&mut self, periods: &[Interval]) -> Vec<Interval> {
        let grid = self.grid();
        if self.slice_cache.capacity() == 0 {
            return slice(periods, grid);
        }

        let key = periods.to_vec();
        if let Some(hit) = self.slice_cache.get(&key) {
            tracing::trace!(op = "slice", "memo hit");
            return hit;
        }
        let slots = slice(periods, grid);
        self.slice_cache.put(key, slots.clone());
        slots
    }
}

fn parse_all<I, S>(rules: I) -> Result<Vec<Rule>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    rules
        .into_iter()
        .map(|rule| parse_rule(rule.as_ref()))
        .collect()
}

/// Calendar days touched by the half-open `[begin, end)` window.
fn window_days(begin: NaiveDateTime, end: NaiveDateTime) -> impl Iterator<Item = NaiveDate> {
    let first = begin.date();
    let last = if begin >= end {
        None
    } else if end.time() == NaiveTime::MIN {
        end.date().pred_opt()
    } else {
        Some(end.date())
    };

    first
        .iter_days()
        .take_while(move |day| last.is_some_and(|last| *day <= last))
}

/// First whole minute at or after `time`.
fn minute_at_or_after(time: NaiveTime) -> i32 {
    let seconds = time.num_seconds_from_midnight() as i32;
    (seconds + 59) / 60
}

/// Minute of day containing `time`.
fn minute_at_or_before(time: NaiveTime) -> i32 {
    time.num_seconds_from_midnight() as i32 / 60
}

fn trim_start(periods: &mut Vec<Interval>, minute: i32) {
    periods.retain(|period| period.end > minute);
    for period in periods.iter_mut() {
        period.begin = period.begin.max(minute);
    }
}

fn trim_end(periods: &mut Vec<Interval>, minute: i32) {
    periods.retain(|period| period.begin < minute);
    for period in periods.iter_mut() {
        period.end = period.end.min(minute);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn window_excludes_end_day_at_midnight() {
        let days: Vec<_> = window_days(at("2014-01-01 12:20:00"), at("2014-01-03 00:00:00")).collect();
        assert_eq!(days.len(), 2);
        assert_eq!(days[1], NaiveDate::from_ymd_opt(2014, 1, 2).unwrap());
    }

    #[test]
    fn inverted_window_is_empty() {
        assert_eq!(
            window_days(at("2014-01-03 00:00:00"), at("2014-01-01 00:00:00")).count(),
            0
        );
    }

    #[test]
    fn minute_rounding_keeps_window_inside_instants() {
        let time = NaiveTime::from_hms_opt(12, 20, 30).unwrap();
        assert_eq!(minute_at_or_after(time), 741);
        assert_eq!(minute_at_or_before(time), 740);
    }

    #[test]
    fn trims_cut_straddling_periods() {
        let mut periods = vec![Interval::new(600, 700), Interval::new(720, 900)];
        trim_start(&mut periods, 740);
        assert_eq!(periods, vec![Interval::new(740, 900)]);
        trim_end(&mut periods, 800);
        assert_eq!(periods, vec![Interval::new(740, 800)]);
    }
}
