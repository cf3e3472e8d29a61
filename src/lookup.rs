use crate::date_key::document_path;
use crate::models::EventRecord;
use crate::store::DocumentStore;
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult {
    Found(EventRecord),
    NotFound,
    Failed(String),
}

impl EventResult {
    /// What the page shows: a failed fetch looks the same as a missing day.
    pub fn into_event(self) -> Option<EventRecord> {
        match self {
            EventResult::Found(record) => Some(record),
            EventResult::NotFound | EventResult::Failed(_) => None,
        }
    }
}

/// Single read of `days/{key}`. Never retries.
pub async fn fetch_event(store: &dyn DocumentStore, key: &str) -> EventResult {
    let path = document_path(key);
    debug!(%path, "fetching event");

    let document = match store.get(&path).await {
        Ok(Some(document)) => document,
        Ok(None) => {
            info!(%path, "no document");
            return EventResult::NotFound;
        }
        Err(err) => {
            error!(%path, "error fetching event: {err}");
            return EventResult::Failed(err.to_string());
        }
    };

    match serde_json::from_value::<EventRecord>(document) {
        Ok(record) => EventResult::Found(record),
        Err(err) => {
            error!(%path, "malformed event document: {err}");
            EventResult::Failed(format!("malformed event document: {err}"))
        }
    }
}
