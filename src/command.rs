use serde::Deserialize;

use crate::limits::MAX_COMMAND_LEN;
use crate::model::*;

/// One user action, read as a JSON object tagged by `"cmd"`.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum Command {
    /// `{"cmd":"submit","name":..,"startTime":..,..}`
    Submit(BookingForm),
    Cancel { id: BookingId },
    Clear,
    Filter { venue: VenueFilter },
    Show,
}

#[derive(Debug, PartialEq)]
pub enum CommandError {
    Empty,
    TooLong(usize),
    Parse(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::TooLong(len) => {
                write!(f, "command too long: {len} bytes (max {MAX_COMMAND_LEN})")
            }
            CommandError::Parse(e) => write!(f, "could not parse command: {e}"),
        }
    }
}

impl std::error::Error for CommandError {}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(CommandError::Empty);
    }
    if trimmed.len() > MAX_COMMAND_LEN {
        return Err(CommandError::TooLong(trimmed.len()));
    }
    serde_json::from_str(trimmed).map_err(|e| CommandError::Parse(e.to_string()))
}
