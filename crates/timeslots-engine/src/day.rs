//! Calendar-day capability used by rule evaluation.
//!
//! Rule filters only need a handful of facts about a day: its zero-padded
//! `YYYYMMDD` and `MMDD` keys, weekday, day of year, and whether it falls on
//! one of the Easter-derived holidays. [`CalendarDay`] captures exactly that,
//! and is implemented for [`chrono::NaiveDate`].

use chrono::{Datelike, Duration, NaiveDate};

use crate::rule::SpecialDay;

pub trait CalendarDay {
    /// Zero-padded `YYYYMMDD`.
    fn ymd_key(&self) -> String;

    /// Day of week with Sunday = 0.
    fn weekday_from_sunday(&self) -> u32;

    /// Zero-padded `MMDD`.
    fn month_day_key(&self) -> String;

    /// 1-based day of year.
    fn day_of_year(&self) -> u32;

    fn is_special_day(&self, special: SpecialDay) -> bool;
}

impl CalendarDay for NaiveDate {
    fn ymd_key(&self) -> String {
        self.format("%Y%m%d").to_string()
    }

    fn weekday_from_sunday(&self) -> u32 {
        self.weekday().num_days_from_sunday() % 7
    }

    fn month_day_key(&self) -> String {
        self.format("%m%d").to_string()
    }

    fn day_of_year(&self) -> u32 {
        self.ordinal()
    }

    fn is_special_day(&self, special: SpecialDay) -> bool {
        special_day_date(self.year(), special).is_some_and(|date| date == *self)
    }
}

/// Easter Sunday of `year` in the Gregorian calendar.
///
/// Anonymous Gregorian computus (Meeus/Jones/Butcher). Returns `None` only for
/// years chrono cannot represent.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Date of `special` in `year`, counted from Easter Sunday.
pub fn special_day_date(year: i32, special: SpecialDay) -> Option<NaiveDate> {
    easter_sunday(year)?.checked_add_signed(Duration::days(special.offset_days()))
}
