//! Seams to the external document and counter store.

use crate::errors::StoreError;
use crate::models::ViewCounter;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

/// Path of the shared page-view counter record.
pub const VIEW_COUNTER_PATH: &str = "counters/views";

/// Read-only access to single documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the document at `path`, `None` when it does not exist.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;
}

/// Shared counters with atomic increments and live snapshots.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add one to the `count` field at `path`. A missing record starts at zero.
    async fn increment(&self, path: &str) -> Result<(), StoreError>;

    /// Receiver seeded with the current value; every later change is published to it.
    async fn subscribe(&self, path: &str) -> Result<watch::Receiver<ViewCounter>, StoreError>;
}
