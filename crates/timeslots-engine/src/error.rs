//! Error types for timeslots-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeSlotError {
    /// The rule string does not follow the `name=value,...;...` clause grammar.
    #[error("Invalid rule format: {0}")]
    InvalidRuleFormat(String),

    /// A clause name is unknown, or one of its values cannot be used.
    #[error("Invalid rule parameter: {0}")]
    InvalidRuleParameter(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, TimeSlotError>;
