use std::fmt::Write;

use chrono::NaiveDate;

use crate::engine::{EngineError, ValidationError};
use crate::model::*;

pub const MSG_CONFIRMED: &str = "Booking confirmed successfully.";
pub const MSG_CLEARED: &str = "All bookings cleared.";
pub const MSG_FILL_REQUIRED: &str = "Please fill all required fields.";
pub const MSG_NO_BOOKINGS: &str = "No bookings found for this filter.";

/// `Tue, Jun 10, 2025`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d, %Y").to_string()
}

/// `10:00 - 11:30`. The end is rounded to the nearest minute.
pub fn format_range(start: TimeOfDay, duration: f64) -> String {
    let end = (start.minutes() as f64 + duration * 60.0).round().max(0.0) as u32;
    format!("{start} - {:02}:{:02}", end / 60, end % 60)
}

pub fn status_for_error(e: &EngineError) -> Status {
    match e {
        EngineError::Validation(ValidationError::MissingField(_)) => Status::error(MSG_FILL_REQUIRED),
        EngineError::Validation(v) => Status::error(capitalize(&v.to_string())),
        EngineError::Conflict { start_time, venue } => Status::error(format!(
            "That slot overlaps with an existing booking at {start_time} for {}.",
            clean(venue.as_str())
        )),
        EngineError::Storage(_) => Status::error("Could not save bookings."),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Stored text may predate form validation, so control characters are
/// escaped before they reach the terminal.
fn clean(s: &str) -> String {
    if !s.chars().any(char::is_control) {
        return s.to_string();
    }
    s.chars()
        .map(|c| if c.is_control() { c.escape_default().to_string() } else { c.to_string() })
        .collect()
}

pub fn render_status(status: &Status) -> String {
    match status.kind {
        StatusKind::Ok => format!("ok: {}", status.text),
        StatusKind::Error => format!("error: {}", status.text),
    }
}

pub fn render_stats(stats: &Stats) -> String {
    format!(
        "{} upcoming booking(s) • {} venue(s) in use • {} sport type(s)",
        stats.bookings, stats.venues, stats.sports
    )
}

pub fn render_booking(b: &Booking) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", clean(b.venue.as_str()), clean(b.sport.as_str()));
    let _ = writeln!(out, "  {} • {}", format_date(b.date), format_range(b.start_time, b.duration));
    let _ = writeln!(out, "  Booked by {} ({})", clean(&b.name), clean(&b.phone));
    if !b.notes.is_empty() {
        let _ = writeln!(out, "  Note: {}", clean(&b.notes));
    }
    let _ = write!(out, "  [cancel {}]", clean(b.id.as_str()));
    out
}

pub fn render_view(view: &View) -> String {
    let mut out = String::new();
    let filter = match &view.filter {
        VenueFilter::All => "all venues",
        VenueFilter::Only(v) => v.as_str(),
    };
    let _ = writeln!(out, "{}", render_stats(&view.stats));
    let _ = writeln!(out, "showing: {filter} (bookable from {})", view.min_date);
    if view.bookings.is_empty() {
        let _ = writeln!(out, "{MSG_NO_BOOKINGS}");
    }
    for b in &view.bookings {
        let _ = writeln!(out, "{}", render_booking(b));
    }
    out
}

pub fn render_response(response: &Response) -> String {
    let mut out = String::new();
    if let Some(status) = &response.status {
        let _ = writeln!(out, "{}", render_status(status));
    }
    out.push_str(&render_view(&response.view));
    out
}
