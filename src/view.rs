//! Page state for one mounted view.
//!
//! All mutation goes through the transition methods below. Lookups are tagged
//! with a sequence number when issued and a completion is applied only if it
//! carries the latest one, so a slow answer for an earlier date can never
//! replace the answer for the date currently selected.

use crate::date_key::{resolve_key, resolve_label, DateLabel, MIN_SUPPORTED_DATE};
use crate::lookup::EventResult;
use crate::models::EventRecord;
use chrono::NaiveDate;

pub const NO_INFORMATION: &str = "Unfortunately we don't have information for this day.";
pub const IMAGE_LOAD_ERROR: &str = "Failed to load image";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("{date} is before {minimum}, the first day with stories")]
    BeforeMinimum { date: NaiveDate, minimum: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    LookupCompleted { seq: u64, result: EventResult },
    CounterUpdated(u64),
}

/// A lookup the caller must run for the key, then report back with `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub seq: u64,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    selected_date: NaiveDate,
    event: Option<EventRecord>,
    image_error: Option<String>,
    view_count: Option<u64>,
    calendar_open: bool,
    latest_seq: u64,
    completed_seq: u64,
}

impl ViewState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            selected_date: today,
            event: None,
            image_error: None,
            view_count: None,
            calendar_open: false,
            latest_seq: 0,
            completed_seq: 0,
        }
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<LookupTicket, ViewError> {
        if date < MIN_SUPPORTED_DATE {
            return Err(ViewError::BeforeMinimum {
                date,
                minimum: MIN_SUPPORTED_DATE,
            });
        }

        self.image_error = None;
        self.selected_date = date;
        self.calendar_open = false;
        self.latest_seq += 1;

        Ok(LookupTicket {
            seq: self.latest_seq,
            key: resolve_key(date),
        })
    }

    /// Returns false when the completion belongs to a superseded lookup.
    pub fn lookup_completed(&mut self, seq: u64, result: EventResult) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        self.event = result.into_event();
        self.completed_seq = seq;
        true
    }

    pub fn counter_updated(&mut self, count: u64) {
        self.view_count = Some(count);
    }

    pub fn image_load_failed(&mut self) {
        self.image_error = Some(IMAGE_LOAD_ERROR.to_string());
    }

    pub fn open_calendar(&mut self) {
        self.calendar_open = true;
    }

    pub fn dismiss_calendar(&mut self) {
        self.calendar_open = false;
    }

    pub fn apply(&mut self, event: ViewEvent) -> bool {
        match event {
            ViewEvent::LookupCompleted { seq, result } => self.lookup_completed(seq, result),
            ViewEvent::CounterUpdated(count) => {
                self.counter_updated(count);
                true
            }
        }
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn label(&self) -> DateLabel {
        resolve_label(self.selected_date)
    }

    pub fn event(&self) -> Option<&EventRecord> {
        self.event.as_ref()
    }

    pub fn image_error(&self) -> Option<&str> {
        self.image_error.as_deref()
    }

    pub fn view_count(&self) -> Option<u64> {
        self.view_count
    }

    pub fn calendar_open(&self) -> bool {
        self.calendar_open
    }

    pub fn is_loading(&self) -> bool {
        self.completed_seq != self.latest_seq
    }
}
