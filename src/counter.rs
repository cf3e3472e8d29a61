use crate::store::{CounterStore, VIEW_COUNTER_PATH};
use crate::view::ViewEvent;
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

/// Keeps the live counter subscription alive. Dropping it releases the subscription.
#[derive(Debug)]
pub struct SubscriptionHandle {
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("view counter subscription released");
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Counts this session once and streams every observed count into `updates`.
///
/// The increment is best effort: failures are logged and forgotten. The
/// forwarded values are whatever the store last published, so another
/// session's increment may arrive before ours.
pub fn start(
    store: Arc<dyn CounterStore>,
    updates: mpsc::UnboundedSender<ViewEvent>,
) -> SubscriptionHandle {
    let increment_store = Arc::clone(&store);
    tokio::spawn(async move {
        if let Err(err) = increment_store.increment(VIEW_COUNTER_PATH).await {
            warn!("failed to record page view: {err}");
        }
    });

    let task = tokio::spawn(async move {
        let mut receiver = match store.subscribe(VIEW_COUNTER_PATH).await {
            Ok(receiver) => receiver,
            Err(err) => {
                warn!("failed to subscribe to view counter: {err}");
                return;
            }
        };

        loop {
            let count = receiver.borrow_and_update().count;
            if updates.send(ViewEvent::CounterUpdated(count)).is_err() {
                break;
            }
            if receiver.changed().await.is_err() {
                break;
            }
        }
    });

    SubscriptionHandle { task: Some(task) }
}
