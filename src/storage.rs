use crate::errors::StoreError;
use crate::models::{AppData, ViewCounter};
use crate::store::{CounterStore, DocumentStore};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tokio::{
    fs,
    sync::{watch, Mutex},
};
use tracing::{debug, error};

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}

struct Inner {
    data: AppData,
    watchers: HashMap<String, watch::Sender<ViewCounter>>,
}

/// Document and counter store kept in memory and, when given a path,
/// written back to a JSON file after every counter change.
pub struct JsonStore {
    data_path: Option<PathBuf>,
    inner: Mutex<Inner>,
}

impl JsonStore {
    pub async fn open(data_path: PathBuf) -> Self {
        let data = load_data(&data_path).await;
        Self::with_path(Some(data_path), data)
    }

    pub fn in_memory(data: AppData) -> Self {
        Self::with_path(None, data)
    }

    fn with_path(data_path: Option<PathBuf>, data: AppData) -> Self {
        Self {
            data_path,
            inner: Mutex::new(Inner {
                data,
                watchers: HashMap::new(),
            }),
        }
    }

    pub async fn counter(&self, path: &str) -> Result<ViewCounter, StoreError> {
        validate_path(path)?;
        let inner = self.inner.lock().await;
        counter_at(&inner.data, path)
    }

    async fn persist(&self, data: &AppData) -> Result<(), StoreError> {
        match &self.data_path {
            Some(path) => persist_data(path, data).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for JsonStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        validate_path(path)?;
        let inner = self.inner.lock().await;
        Ok(inner.data.documents.get(path).cloned())
    }
}

#[async_trait]
impl CounterStore for JsonStore {
    async fn increment(&self, path: &str) -> Result<(), StoreError> {
        validate_path(path)?;
        let mut inner = self.inner.lock().await;
        let mut counter = counter_at(&inner.data, path)?;
        counter.count = counter.count.saturating_add(1);
        let mut updated = inner.data.clone();
        updated
            .documents
            .insert(path.to_string(), serde_json::to_value(counter)?);
        self.persist(&updated).await?;
        inner.data = updated;

        if let Some(sender) = inner.watchers.get(path) {
            sender.send_replace(counter);
        }
        debug!(path, count = counter.count, "counter incremented");
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<watch::Receiver<ViewCounter>, StoreError> {
        validate_path(path)?;
        let mut inner = self.inner.lock().await;
        if let Some(sender) = inner.watchers.get(path) {
            return Ok(sender.subscribe());
        }
        let (sender, receiver) = watch::channel(counter_at(&inner.data, path)?);
        inner.watchers.insert(path.to_string(), sender);
        Ok(receiver)
    }
}

fn validate_path(path: &str) -> Result<(), StoreError> {
    match path.split_once('/') {
        Some((collection, id)) if !collection.is_empty() && !id.is_empty() && !id.contains('/') => {
            Ok(())
        }
        _ => Err(StoreError::InvalidPath(path.to_string())),
    }
}

fn counter_at(data: &AppData, path: &str) -> Result<ViewCounter, StoreError> {
    match data.documents.get(path) {
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|_| StoreError::InvalidCounter(path.to_string())),
        None => Ok(ViewCounter::default()),
    }
}
