use chrono::NaiveDate;

use crate::model::*;

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Two bookings conflict when they share a venue and a date and their
/// half-open time spans intersect. Touching spans and empty spans never do.
pub fn has_conflict(candidate: &Booking, existing: &Booking) -> bool {
    if candidate.venue != existing.venue || candidate.date != existing.date {
        return false;
    }
    candidate.span().overlaps(&existing.span())
}

/// First booking, in collection order, that conflicts with `candidate`.
pub fn find_conflict<'a>(candidate: &Booking, bookings: &'a [Booking]) -> Option<&'a Booking> {
    bookings.iter().find(|existing| has_conflict(candidate, existing))
}
