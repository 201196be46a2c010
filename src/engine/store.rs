use tracing::{debug, warn};

use crate::backend::KvBackend;
use crate::model::{Booking, BookingId};

use super::EngineError;

pub const DEFAULT_STORAGE_KEY: &str = "playslot_bookings";

/// The booking collection, serialized as one JSON array under one key.
///
/// Holds no copy of the data: every call reads the backend again.
pub struct BookingStore<B> {
    backend: B,
    key: String,
}

impl<B: KvBackend> BookingStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self { backend, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read the collection in insertion order for display. Missing,
    /// unreadable, or malformed data all load as an empty collection.
    pub fn load(&self) -> Vec<Booking> {
        self.try_load().unwrap_or_else(|e| {
            warn!(key = %self.key, "failed to read bookings, treating as empty: {e}");
            metrics::counter!(crate::observability::STORE_LOAD_FAILURES_TOTAL).increment(1);
            Vec::new()
        })
    }

    /// Read the collection for a read-modify-write. A backend read error is
    /// returned so the caller never saves over data it could not see.
    /// Malformed data still loads as empty.
    pub fn try_load(&self) -> Result<Vec<Booking>, EngineError> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(e) => return Err(EngineError::Storage(e.to_string())),
        };
        match serde_json::from_str(&raw) {
            Ok(bookings) => Ok(bookings),
            Err(e) => {
                warn!(key = %self.key, "stored bookings are malformed, treating as empty: {e}");
                metrics::counter!(crate::observability::STORE_LOAD_FAILURES_TOTAL).increment(1);
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the whole collection with a single backend write.
    pub fn save(&self, bookings: &[Booking]) -> Result<(), EngineError> {
        let raw = serde_json::to_string(bookings).map_err(|e| EngineError::Storage(e.to_string()))?;
        self.backend
            .set(&self.key, &raw)
            .map_err(|e| EngineError::Storage(e.to_string()))?;
        debug!(key = %self.key, count = bookings.len(), "saved bookings");
        Ok(())
    }

    pub fn append(&self, booking: Booking) -> Result<(), EngineError> {
        let mut bookings = self.try_load()?;
        bookings.push(booking);
        self.save(&bookings)
    }

    /// Remove every booking with `id`. Returns whether anything was removed;
    /// an unknown id still rewrites the collection unchanged.
    pub fn remove_by_id(&self, id: &BookingId) -> Result<bool, EngineError> {
        let mut bookings = self.try_load()?;
        let before = bookings.len();
        bookings.retain(|b| &b.id != id);
        let removed = bookings.len() != before;
        self.save(&bookings)?;
        Ok(removed)
    }

    pub fn clear(&self) -> Result<(), EngineError> {
        self.save(&[])
    }
}
