//! # timeslots-engine
//!
//! Rule-based opening hours and bookable time slots.
//!
//! Opening and closing hours are declared as compact rule strings such as
//! `p=540-720,840-1080;wd=1-5` (9:00–12:00 and 14:00–18:00, Monday to Friday).
//! For any calendar day the engine evaluates which rules apply, merges their
//! minute-of-day intervals, subtracts the closed ones, and slices the result
//! into fixed-width slots.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use timeslots_engine::{Calendar, Interval};
//!
//! let mut calendar = Calendar::new();
//! calendar.add_open_rules(["p=600-700,800-900"]).unwrap();
//! calendar.add_close_rules(["p=650-850"]).unwrap();
//!
//! let day = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
//! let periods = calendar.get_periods_of_day(day);
//! assert_eq!(periods, vec![Interval::new(600, 650), Interval::new(850, 900)]);
//! ```
//!
//! ## Modules
//!
//! - [`rule`] — rule string → typed [`Rule`]
//! - [`day`] — calendar-day facts and the Easter computus
//! - [`predicate`] — which rules are active on a day
//! - [`reduce`] — merge intervals into a sorted disjoint cover
//! - [`subtract`] — open intervals minus closed intervals
//! - [`slots`] — slice periods into fixed-width slots
//! - [`memo`] — bounded FIFO memoization
//! - [`calendar`] — the rule-holding orchestrator and day-range queries
//! - [`config`] — configuration and JSON rule files
//! - [`error`] — Error types

pub mod calendar;
pub mod config;
pub mod day;
pub mod error;
pub mod interval;
pub mod memo;
pub mod predicate;
pub mod reduce;
pub mod rule;
pub mod slots;
pub mod subtract;

pub use calendar::Calendar;
pub use config::{CalendarConfig, RuleFile};
pub use day::{easter_sunday, CalendarDay};
pub use error::TimeSlotError;
pub use interval::{periods_from_json, DayMap, Interval, MINUTES_PER_DAY};
pub use memo::MemoCache;
pub use predicate::active_intervals;
pub use reduce::reduce;
pub use rule::{parse_rule, Rule, RuleKind, RuleValue, SpecialDay};
pub use slots::{slice, SlotGrid};
pub use subtract::subtract;
