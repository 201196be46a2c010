mod conflict;
mod error;
mod mutations;
mod queries;
mod store;

pub use conflict::{find_conflict, has_conflict};
pub use error::{EngineError, ValidationError};
pub use queries::{sorted_filtered, stats};
pub use store::{BookingStore, DEFAULT_STORAGE_KEY};

use chrono::NaiveDate;

use crate::backend::KvBackend;
use crate::command::Command;
use crate::model::*;
use crate::render;

/// The application controller. Owns the store and the current venue filter,
/// and runs one command to completion at a time.
pub struct Engine<B> {
    store: BookingStore<B>,
    filter: VenueFilter,
    /// Pinned "today"; the local date is used when unset.
    today: Option<NaiveDate>,
}

impl<B: KvBackend> Engine<B> {
    pub fn new(store: BookingStore<B>) -> Self {
        Self {
            store,
            filter: VenueFilter::All,
            today: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn store(&self) -> &BookingStore<B> {
        &self.store
    }

    pub fn filter(&self) -> &VenueFilter {
        &self.filter
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(conflict::today)
    }

    /// Earliest date a new booking may use.
    pub fn min_date(&self) -> NaiveDate {
        self.today()
    }

    /// Run one command and describe the resulting screen.
    pub fn dispatch(&mut self, cmd: Command) -> Response {
        let label = crate::observability::command_label(&cmd);
        let started = std::time::Instant::now();

        let result = match cmd {
            Command::Submit(form) => self
                .submit(form)
                .map(|_| Some(Status::ok(render::MSG_CONFIRMED))),
            Command::Cancel { id } => self.cancel(&id).map(|_| None),
            Command::Clear => self.clear_all().map(|_| Some(Status::ok(render::MSG_CLEARED))),
            Command::Filter { venue } => {
                self.change_filter(venue);
                Ok(None)
            }
            Command::Show => Ok(None),
        };

        let status = match result {
            Ok(status) => status,
            Err(e) => {
                if let EngineError::Storage(_) = e {
                    tracing::error!("{label} failed: {e}");
                }
                Some(render::status_for_error(&e))
            }
        };
        let outcome = match &status {
            Some(Status { kind: StatusKind::Error, .. }) => "error",
            _ => "ok",
        };
        metrics::counter!(crate::observability::COMMANDS_TOTAL, "command" => label, "status" => outcome)
            .increment(1);
        metrics::histogram!(crate::observability::COMMAND_DURATION_SECONDS, "command" => label)
            .record(started.elapsed().as_secs_f64());

        Response {
            status,
            view: self.view(),
        }
    }
}
