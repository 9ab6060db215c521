//! Rule grammar parsing.
//!
//! A rule string is a `;`-separated list of clauses `name=v1,v2,...`, where
//! every value is either a scalar or a `min-max` range:
//!
//! ```text
//! p=540-720,840-1080;wd=1-5
//! periods=600-900;sd=easter,pentecost
//! ```
//!
//! Clause names are resolved to a [`RuleKind`] while parsing, and the values
//! are coerced to the type that kind compares against, so a rule that parses
//! successfully can always be evaluated.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TimeSlotError};
use crate::interval::Interval;

/// A single clause value: an exact match or an inclusive range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValue<T> {
    Exact(T),
    Range { min: T, max: T },
}

impl<T: PartialOrd> RuleValue<T> {
    pub fn matches(&self, candidate: &T) -> bool {
        match self {
            RuleValue::Exact(value) => candidate == value,
            RuleValue::Range { min, max } => candidate >= min && candidate <= max,
        }
    }
}

/// Fixed holidays derived from the Easter Sunday date of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialDay {
    Easter,
    EasterMonday,
    /// Easter + 39 days.
    Ascension,
    /// Easter + 88 days.
    Pentecost,
}

impl SpecialDay {
    /// Offset in days from Easter Sunday.
    pub fn offset_days(self) -> i64 {
        match self {
            SpecialDay::Easter => 0,
            SpecialDay::EasterMonday => 1,
            SpecialDay::Ascension => 39,
            SpecialDay::Pentecost => 88,
        }
    }
}

impl FromStr for SpecialDay {
    type Err = TimeSlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "easter" | "paques" | "pâques" => Ok(SpecialDay::Easter),
            "easterMonday" | "lundiPaques" | "lundiPâques" => Ok(SpecialDay::EasterMonday),
            "ascension" => Ok(SpecialDay::Ascension),
            "pentecost" | "pentecote" | "pentecôte" => Ok(SpecialDay::Pentecost),
            "today" | "aujourdhui" | "tomorrow" | "demain" => Err(TimeSlotError::InvalidRuleParameter(
                format!("(specialdays) relative day '{}' is not supported", s),
            )),
            other => Err(TimeSlotError::InvalidRuleParameter(format!(
                "(specialdays) unknown special day '{}'",
                other
            ))),
        }
    }
}

/// One typed clause of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Minute-of-day intervals contributed when the rule is active.
    Periods(Vec<Interval>),
    /// Exact dates or date ranges as zero-padded `YYYYMMDD`.
    Days(Vec<RuleValue<String>>),
    /// Day of week, Sunday = 0.
    Weekdays(Vec<RuleValue<u32>>),
    /// Yearly recurring month-day as zero-padded `MMDD`.
    BirthDays(Vec<RuleValue<String>>),
    /// 1-based day of year.
    YearDays(Vec<RuleValue<u32>>),
    SpecialDays(Vec<SpecialDay>),
}

impl RuleKind {
    /// Canonical clause name.
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Periods(_) => "periods",
            RuleKind::Days(_) => "days",
            RuleKind::Weekdays(_) => "weekdays",
            RuleKind::BirthDays(_) => "birthdays",
            RuleKind::YearDays(_) => "yeardays",
            RuleKind::SpecialDays(_) => "specialdays",
        }
    }

    /// Append the values of `other`, which must be the same kind.
    fn extend(&mut self, other: RuleKind) {
        match (self, other) {
            (RuleKind::Periods(a), RuleKind::Periods(b)) => a.extend(b),
            (RuleKind::Days(a), RuleKind::Days(b)) => a.extend(b),
            (RuleKind::Weekdays(a), RuleKind::Weekdays(b)) => a.extend(b),
            (RuleKind::BirthDays(a), RuleKind::BirthDays(b)) => a.extend(b),
            (RuleKind::YearDays(a), RuleKind::YearDays(b)) => a.extend(b),
            (RuleKind::SpecialDays(a), RuleKind::SpecialDays(b)) => a.extend(b),
            _ => unreachable!("extend called with mismatched rule kinds"),
        }
    }
}

/// A parsed rule: at most one clause per [`RuleKind`], in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    source: String,
    clauses: Vec<RuleKind>,
}

impl Rule {
    /// The rule string this rule was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn clauses(&self) -> &[RuleKind] {
        &self.clauses
    }

    /// A rule without a periods clause never contributes intervals.
    pub fn is_inert(&self) -> bool {
        self.periods().is_none()
    }

    pub fn periods(&self) -> Option<&[Interval]> {
        self.clauses.iter().find_map(|clause| match clause {
            RuleKind::Periods(periods) => Some(periods.as_slice()),
            _ => None,
        })
    }

    /// Day filters: every clause except the periods clause.
    pub fn filters(&self) -> impl Iterator<Item = &RuleKind> {
        self.clauses
            .iter()
            .filter(|clause| !matches!(clause, RuleKind::Periods(_)))
    }

    fn insert(&mut self, clause: RuleKind) {
        match self
            .clauses
            .iter_mut()
            .find(|existing| std::mem::discriminant(*existing) == std::mem::discriminant(&clause))
        {
            Some(existing) => existing.extend(clause),
            None => self.clauses.push(clause),
        }
    }
}

impl FromStr for Rule {
    type Err = TimeSlotError;

    fn from_str(s: &str) -> Result<Self> {
        parse_rule(s)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A clause value before type coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RawValue<'a> {
    Scalar(&'a str),
    Range(&'a str, &'a str),
}

/// Parse a rule string into a typed [`Rule`].
///
/// # Errors
/// Returns `TimeSlotError::InvalidRuleFormat` when a clause has no `=`, an
/// empty name, or a malformed range.
/// Returns `TimeSlotError::InvalidRuleParameter` when a clause name is not
/// recognized or a value cannot be coerced for its clause (non-integer
/// minutes or day numbers, a period with `min >= max`, an unknown special day).
pub fn parse_rule(rule: &str) -> Result<Rule> {
    let mut parsed = Rule {
        source: rule.trim().to_string(),
        clauses: Vec::new(),
    };

    for clause in rule.split(';') {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }

        let (name, values) = clause.split_once('=').ok_or_else(|| {
            TimeSlotError::InvalidRuleFormat(format!("clause '{}' is missing '='", clause))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(TimeSlotError::InvalidRuleFormat(format!(
                "clause '{}' has no name",
                clause
            )));
        }

        let raw = split_values(values)?;
        parsed.insert(typed_clause(name, &raw)?);
    }

    Ok(parsed)
}

fn split_values(values: &str) -> Result<Vec<RawValue<'_>>> {
    values
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| match value.split_once('-') {
            None => Ok(RawValue::Scalar(value)),
            Some((min, max)) => {
                let (min, max) = (min.trim(), max.trim());
                if min.is_empty() || max.is_empty() || max.contains('-') {
                    Err(TimeSlotError::InvalidRuleFormat(format!(
                        "malformed range '{}'",
                        value
                    )))
                } else {
                    Ok(RawValue::Range(min, max))
                }
            }
        })
        .collect()
}

fn typed_clause(name: &str, values: &[RawValue<'_>]) -> Result<RuleKind> {
    match name {
        "periods" | "p" => values
            .iter()
            .map(|value| period(name, value))
            .collect::<Result<Vec<_>>>()
            .map(RuleKind::Periods),
        "days" | "d" => Ok(RuleKind::Days(string_values(values))),
        "weekdays" | "wd" => integer_values(name, values).map(RuleKind::Weekdays),
        "birthdays" | "bd" => Ok(RuleKind::BirthDays(string_values(values))),
        "yeardays" | "yd" => integer_values(name, values).map(RuleKind::YearDays),
        "specialdays" | "sd" => values
            .iter()
            .map(|value| match value {
                RawValue::Scalar(s) => s.parse::<SpecialDay>(),
                RawValue::Range(min, max) => Err(TimeSlotError::InvalidRuleParameter(format!(
                    "({}) ranges are not allowed: '{}-{}'",
                    name, min, max
                ))),
            })
            .collect::<Result<Vec<_>>>()
            .map(RuleKind::SpecialDays),
        other => Err(TimeSlotError::InvalidRuleParameter(format!(
            "({}) unknown clause",
            other
        ))),
    }
}

fn period(name: &str, value: &RawValue<'_>) -> Result<Interval> {
    let RawValue::Range(min, max) = value else {
        return Err(TimeSlotError::InvalidRuleParameter(format!(
            "({}) expected a min-max range",
            name
        )));
    };
    let begin = integer(name, min)?;
    let end = integer(name, max)?;
    if begin >= end {
        return Err(TimeSlotError::InvalidRuleParameter(format!(
            "({}) range {}-{} is empty",
            name, begin, end
        )));
    }
    Ok(Interval { begin, end })
}

fn string_values(values: &[RawValue<'_>]) -> Vec<RuleValue<String>> {
    values
        .iter()
        .map(|value| match value {
            RawValue::Scalar(s) => RuleValue::Exact(s.to_string()),
            RawValue::Range(min, max) => RuleValue::Range {
                min: min.to_string(),
                max: max.to_string(),
            },
        })
        .collect()
}

fn integer_values<T: FromStr>(name: &str, values: &[RawValue<'_>]) -> Result<Vec<RuleValue<T>>> {
    values
        .iter()
        .map(|value| match value {
            RawValue::Scalar(s) => integer(name, s).map(RuleValue::Exact),
            RawValue::Range(min, max) => Ok(RuleValue::Range {
                min: integer(name, min)?,
                max: integer(name, max)?,
            }),
        })
        .collect()
}

fn integer<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        TimeSlotError::InvalidRuleParameter(format!("({}) '{}' is not an integer", name, value))
    })
}
