//! Decide whether a rule applies to a given day.
//!
//! Every non-periods clause is a day filter, and filters are AND-ed: a rule is
//! active only if each filter with at least one value matches the day. The
//! values within a single filter are OR-ed.

use crate::day::CalendarDay;
use crate::interval::Interval;
use crate::rule::{Rule, RuleKind};

/// Raw intervals a rule contributes on `day`, in declaration order.
///
/// Returns an empty list for inert rules (no periods clause) and for rules
/// with a filter that does not match `day`. The intervals are not reduced.
pub fn active_intervals<D: CalendarDay>(day: &D, rule: &Rule) -> Vec<Interval> {
    let Some(periods) = rule.periods() else {
        return Vec::new();
    };

    if rule.filters().all(|filter| filter_matches(day, filter)) {
        periods.to_vec()
    } else {
        Vec::new()
    }
}

/// Whether a single clause accepts `day`. A clause with no values, and the
/// periods clause itself, accept every day.
pub fn filter_matches<D: CalendarDay>(day: &D, clause: &RuleKind) -> bool {
    match clause {
        RuleKind::Periods(_) => true,
        RuleKind::Days(values) => {
            let key = day.ymd_key();
            values.is_empty() || values.iter().any(|v| v.matches(&key))
        }
        RuleKind::Weekdays(values) => {
            let weekday = day.weekday_from_sunday();
            values.is_empty() || values.iter().any(|v| v.matches(&weekday))
        }
        RuleKind::BirthDays(values) => {
            let key = day.month_day_key();
            values.is_empty() || values.iter().any(|v| v.matches(&key))
        }
        RuleKind::YearDays(values) => {
            let ordinal = day.day_of_year();
            values.is_empty() || values.iter().any(|v| v.matches(&ordinal))
        }
        RuleKind::SpecialDays(values) => {
            values.is_empty() || values.iter().any(|special| day.is_special_day(*special))
        }
    }
}
