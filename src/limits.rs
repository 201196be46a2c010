/// Minutes in one calendar day. A booking must end at or before this offset.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_PHONE_LEN: usize = 32;
pub const MAX_NOTES_LEN: usize = 1000;

/// Largest accepted command line on the controller input, in bytes.
pub const MAX_COMMAND_LEN: usize = 16 * 1024;
