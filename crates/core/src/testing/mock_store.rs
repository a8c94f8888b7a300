//! Mock version store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::release::ReleaseInfo;
use crate::store::{record_id, PublishOutcome, StoreError, VersionStore};

/// Mock implementation of the [`VersionStore`] trait.
///
/// Keeps records in memory keyed by record id with real
/// created/already-exists semantics, returns a configurable low-water
/// mark, and can fail the next read or the next publish independently.
#[derive(Default)]
pub struct MockVersionStore {
    last_published: Arc<RwLock<Option<String>>>,
    records: Arc<RwLock<HashMap<String, ReleaseInfo>>>,
    next_read_error: Arc<RwLock<Option<StoreError>>>,
    next_publish_error: Arc<RwLock<Option<StoreError>>>,
}

impl MockVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the version reported as most recently published.
    pub async fn set_last_published(&self, version: &str) {
        *self.last_published.write().await = Some(version.to_string());
    }

    /// Configure the next `last_published` call to fail.
    pub async fn set_read_error(&self, error: StoreError) {
        *self.next_read_error.write().await = Some(error);
    }

    /// Configure the next `publish` call to fail.
    pub async fn set_publish_error(&self, error: StoreError) {
        *self.next_publish_error.write().await = Some(error);
    }

    /// All stored records, keyed by record id.
    pub async fn records(&self) -> HashMap<String, ReleaseInfo> {
        self.records.read().await.clone()
    }

    /// Number of stored records.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl VersionStore for MockVersionStore {
    async fn last_published(&self) -> Result<Option<String>, StoreError> {
        if let Some(err) = self.next_read_error.write().await.take() {
            return Err(err);
        }

        Ok(self.last_published.read().await.clone())
    }

    async fn publish(&self, info: &ReleaseInfo) -> Result<PublishOutcome, StoreError> {
        if let Some(err) = self.next_publish_error.write().await.take() {
            return Err(err);
        }

        let id = record_id(&info.release.url);
        let mut records = self.records.write().await;
        if records.contains_key(&id) {
            Ok(PublishOutcome::AlreadyExists)
        } else {
            records.insert(id, info.clone());
            Ok(PublishOutcome::Created)
        }
    }
}
