use tracing::{debug, info};

use crate::backend::KvBackend;
use crate::model::*;

use super::conflict::find_conflict;
use super::{Engine, EngineError};

impl<B: KvBackend> Engine<B> {
    /// Validate the form, reject it if it overlaps a stored booking, and
    /// persist it otherwise.
    pub fn submit(&self, form: BookingForm) -> Result<Booking, EngineError> {
        let booking = form.into_booking(BookingId::generate(), self.today())?;

        let existing = self.store.try_load()?;
        if let Some(conflicting) = find_conflict(&booking, &existing) {
            info!(
                venue = %booking.venue,
                date = %booking.date,
                start = %booking.start_time,
                conflicting = %conflicting.id,
                "rejected overlapping booking"
            );
            metrics::counter!(crate::observability::CONFLICTS_TOTAL).increment(1);
            return Err(EngineError::Conflict {
                start_time: conflicting.start_time,
                venue: conflicting.venue.clone(),
            });
        }

        self.store.append(booking.clone())?;
        info!(id = %booking.id, venue = %booking.venue, date = %booking.date, "booking confirmed");
        metrics::counter!(crate::observability::BOOKINGS_CONFIRMED_TOTAL).increment(1);
        Ok(booking)
    }

    /// Cancel one booking. Unknown ids are not an error.
    pub fn cancel(&self, id: &BookingId) -> Result<bool, EngineError> {
        let removed = self.store.remove_by_id(id)?;
        if removed {
            info!(%id, "booking cancelled");
        } else {
            debug!(%id, "cancel for unknown booking");
        }
        Ok(removed)
    }

    pub fn clear_all(&self) -> Result<(), EngineError> {
        self.store.clear()?;
        info!("all bookings cleared");
        Ok(())
    }

    pub fn change_filter(&mut self, filter: VenueFilter) {
        self.filter = filter;
    }
}
