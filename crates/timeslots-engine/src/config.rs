//! Calendar configuration and rule files.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimeSlotError};
use crate::interval::MINUTES_PER_DAY;

fn default_granularity() -> u32 {
    30
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

/// Tunables of a [`crate::Calendar`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Width of generated time slots, in minutes.
    #[serde(default = "default_granularity")]
    pub granularity: u32,
    /// Align slot starts on multiples of `granularity` from midnight.
    #[serde(default)]
    pub midnight_alignment: bool,
    /// Entries kept per memoized operation; 0 disables memoization.
    #[serde(default)]
    pub cache_size: usize,
    /// chrono strftime format of the per-day result keys.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            granularity: default_granularity(),
            midnight_alignment: false,
            cache_size: 0,
            date_format: default_date_format(),
        }
    }
}

impl CalendarConfig {
    /// # Errors
    /// Returns `TimeSlotError::InvalidConfiguration` for a granularity outside
    /// `1..=1440` or an empty or malformed date format.
    pub fn validate(&self) -> Result<()> {
        validate_granularity(self.granularity)?;
        validate_date_format(&self.date_format)
    }
}

pub(crate) fn validate_granularity(minutes: u32) -> Result<()> {
    if minutes == 0 || minutes > MINUTES_PER_DAY as u32 {
        return Err(TimeSlotError::InvalidConfiguration(format!(
            "granularity must be between 1 and {} minutes, got {}",
            MINUTES_PER_DAY, minutes
        )));
    }
    Ok(())
}

pub(crate) fn validate_date_format(format: &str) -> Result<()> {
    if format.trim().is_empty() {
        return Err(TimeSlotError::InvalidConfiguration(
            "date format must not be empty".to_string(),
        ));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(TimeSlotError::InvalidConfiguration(format!(
            "invalid date format '{}'",
            format
        )));
    }
    // Time and offset fields parse but fail to render for a date.
    render_date(NaiveDate::MIN, format).map(|_| ()).ok_or_else(|| {
        TimeSlotError::InvalidConfiguration(format!(
            "date format '{}' uses fields a calendar day cannot render",
            format
        ))
    })
}

/// `day` formatted with `format`, or `None` if chrono cannot render it.
pub(crate) fn render_date(day: NaiveDate, format: &str) -> Option<String> {
    let mut key = String::new();
    write!(key, "{}", day.format(format)).ok()?;
    Some(key)
}

/// A JSON document bundling configuration with open and close rules.
///
/// ```json
/// {
///   "config": { "granularity": 15, "midnight_alignment": true },
///   "open": ["p=540-720,840-1080;wd=1-5"],
///   "close": ["p=0-1440;sd=easter,easterMonday"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub config: CalendarConfig,
    #[serde(default)]
    pub open: Vec<String>,
    #[serde(default)]
    pub close: Vec<String>,
}

impl RuleFile {
    /// # Errors
    /// Returns `TimeSlotError::InvalidConfiguration` if `json` is not a valid
    /// rule file.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TimeSlotError::InvalidConfiguration(format!("rule file: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let file = RuleFile::from_json(r#"{"open": ["p=600-700"]}"#).unwrap();
        assert_eq!(file.config, CalendarConfig::default());
        assert_eq!(file.open, vec!["p=600-700".to_string()]);
        assert!(file.close.is_empty());
    }

    #[test]
    fn granularity_bounds() {
        assert!(validate_granularity(0).is_err());
        assert!(validate_granularity(1).is_ok());
        assert!(validate_granularity(1440).is_ok());
        assert!(validate_granularity(1441).is_err());
    }

    #[test]
    fn date_format_must_be_valid_strftime() {
        assert!(validate_date_format("%d/%m/%Y").is_ok());
        assert!(validate_date_format("").is_err());
        assert!(validate_date_format("%Y-%Q").is_err());
    }

    #[test]
    fn date_format_rejects_time_fields() {
        assert!(validate_date_format("%H").is_err());
        assert!(validate_date_format("%Y-%m-%d %H:%M").is_err());
        assert!(validate_date_format("%Y%z").is_err());
        assert!(validate_date_format("%a %e %b %Y (%j)").is_ok());
    }
}
