use chrono::NaiveDate;

use crate::model::{TimeOfDay, Venue};

/// A form value that cannot become a booking.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingField(&'static str),
    TooLong(&'static str),
    ControlCharacter(&'static str),
    UnknownSport(String),
    UnknownVenue(String),
    InvalidDate(String),
    DateInPast(NaiveDate),
    InvalidTime(String),
    InvalidDuration(String),
    CrossesMidnight { start_time: TimeOfDay, duration: f64 },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "missing required field: {field}"),
            ValidationError::TooLong(field) => write!(f, "{field} is too long"),
            ValidationError::ControlCharacter(field) => {
                write!(f, "{field} contains control characters")
            }
            ValidationError::UnknownSport(s) => write!(f, "unknown sport: {s}"),
            ValidationError::UnknownVenue(v) => write!(f, "unknown venue: {v}"),
            ValidationError::InvalidDate(d) => write!(f, "invalid date (expected YYYY-MM-DD): {d}"),
            ValidationError::DateInPast(d) => write!(f, "date {d} is in the past"),
            ValidationError::InvalidTime(t) => write!(f, "invalid start time (expected HH:MM): {t}"),
            ValidationError::InvalidDuration(d) => {
                write!(f, "invalid duration (expected a positive number of hours): {d}")
            }
            ValidationError::CrossesMidnight { start_time, duration } => {
                write!(f, "a {duration}h booking starting at {start_time} would run past midnight")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum EngineError {
    Validation(ValidationError),
    /// The candidate overlaps an existing booking at the same venue and date.
    Conflict {
        start_time: TimeOfDay,
        venue: Venue,
    },
    Storage(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(e) => write!(f, "validation failed: {e}"),
            EngineError::Conflict { start_time, venue } => {
                write!(f, "conflict with booking at {start_time} for {venue}")
            }
            EngineError::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ValidationError> for EngineError {
    fn from(e: ValidationError) -> Self {
        EngineError::Validation(e)
    }
}
