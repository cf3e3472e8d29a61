//! Library-side driver for one page view, for embedders that run the flow in
//! Rust. The HTTP binary serves the same flow through `handlers` and the page
//! script, rendering with `ViewState` directly so a server render never counts
//! as a view.

use crate::config::Config;
use crate::counter::{self, SubscriptionHandle};
use crate::date_key::MIN_SUPPORTED_DATE;
use crate::lookup::{fetch_event, EventResult};
use crate::store::{CounterStore, DocumentStore};
use crate::view::{LookupTicket, ViewError, ViewEvent, ViewState};
use chrono::NaiveDate;
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One mounted page: owns the state and feeds it lookup results and counter
/// updates in arrival order.
pub struct ViewSession {
    state: ViewState,
    documents: Arc<dyn DocumentStore>,
    lookup_timeout: Option<Duration>,
    events_tx: mpsc::UnboundedSender<ViewEvent>,
    events_rx: mpsc::UnboundedReceiver<ViewEvent>,
    counter: SubscriptionHandle,
}

impl ViewSession {
    /// Must be called inside a tokio runtime.
    pub fn mount(
        documents: Arc<dyn DocumentStore>,
        counters: Arc<dyn CounterStore>,
        today: NaiveDate,
        config: &Config,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let counter = counter::start(counters, events_tx.clone());

        let mut session = Self {
            state: ViewState::new(today),
            documents,
            lookup_timeout: config.lookup_timeout,
            events_tx,
            events_rx,
            counter,
        };

        let initial = today.max(MIN_SUPPORTED_DATE);
        if let Err(err) = session.select_date(initial) {
            warn!("initial lookup not issued: {err}");
        }
        session
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<u64, ViewError> {
        let LookupTicket { seq, key } = self.state.select_date(date)?;
        debug!(seq, %key, "fetching events");

        let documents = Arc::clone(&self.documents);
        let events_tx = self.events_tx.clone();
        let lookup_timeout = self.lookup_timeout;
        tokio::spawn(async move {
            let fetch = fetch_event(documents.as_ref(), &key);
            let result = match lookup_timeout {
                Some(limit) => tokio::time::timeout(limit, fetch)
                    .await
                    .unwrap_or_else(|_| EventResult::Failed("lookup timed out".to_string())),
                None => fetch.await,
            };
            let _ = events_tx.send(ViewEvent::LookupCompleted { seq, result });
        });

        Ok(seq)
    }

    /// Waits for the next lookup completion or counter update and applies it.
    pub async fn next_event(&mut self) -> Option<ViewEvent> {
        let event = self.events_rx.recv().await?;
        if !self.state.apply(event.clone()) {
            debug!(?event, "dropped stale lookup result");
        }
        Some(event)
    }

    pub fn image_load_failed(&mut self) {
        self.state.image_load_failed();
    }

    pub fn open_calendar(&mut self) {
        self.state.open_calendar();
    }

    pub fn dismiss_calendar(&mut self) {
        self.state.dismiss_calendar();
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_subscribed(&self) -> bool {
        self.counter.is_active()
    }

    pub fn unmount(mut self) -> ViewState {
        self.counter.release();
        self.state
    }
}
