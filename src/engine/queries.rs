use std::collections::HashSet;

use crate::backend::KvBackend;
use crate::model::*;

use super::Engine;

/// Counts for the stats banner.
pub fn stats(bookings: &[Booking]) -> Stats {
    let venues: HashSet<&Venue> = bookings.iter().map(|b| &b.venue).collect();
    let sports: HashSet<&Sport> = bookings.iter().map(|b| &b.sport).collect();
    Stats {
        bookings: bookings.len(),
        venues: venues.len(),
        sports: sports.len(),
    }
}

/// Stable sort by `(date, start_time)`, then keep the venues `filter` allows.
pub fn sorted_filtered(mut bookings: Vec<Booking>, filter: &VenueFilter) -> Vec<Booking> {
    bookings.sort_by_key(|b| (b.date, b.start_time));
    bookings.retain(|b| filter.matches(&b.venue));
    bookings
}

impl<B: KvBackend> Engine<B> {
    pub fn listing(&self) -> Vec<Booking> {
        sorted_filtered(self.store.load(), &self.filter)
    }

    pub fn stats(&self) -> Stats {
        stats(&self.store.load())
    }

    /// Stats come from the full collection, the listing from the filtered one.
    pub fn view(&self) -> View {
        let all = self.store.load();
        View {
            filter: self.filter.clone(),
            stats: stats(&all),
            bookings: sorted_filtered(all, &self.filter),
            min_date: self.min_date(),
        }
    }
}
