//! Mock update catalog for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::release::{Release, SystemAddon};
use crate::update_catalog::{CatalogError, UpdateCatalog};

/// Mock implementation of the [`UpdateCatalog`] trait.
///
/// Returns a configurable update list, records every queried release, and
/// can fail the next query.
#[derive(Default)]
pub struct MockUpdateCatalog {
    updates: Arc<RwLock<Vec<SystemAddon>>>,
    queries: Arc<RwLock<Vec<Release>>>,
    next_error: Arc<RwLock<Option<CatalogError>>>,
}

impl MockUpdateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the updates returned for every subsequent query.
    pub async fn set_updates(&self, updates: Vec<SystemAddon>) {
        *self.updates.write().await = updates;
    }

    /// Configure the next query to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Releases queried so far, in order.
    pub async fn recorded_queries(&self) -> Vec<Release> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl UpdateCatalog for MockUpdateCatalog {
    async fn fetch_updates(
        &self,
        release: &Release,
        _builtins: &[SystemAddon],
    ) -> Result<Vec<SystemAddon>, CatalogError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.queries.write().await.push(release.clone());
        Ok(self.updates.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::UNKNOWN;

    fn release() -> Release {
        Release {
            url: "https://example.test/firefox-52.0.tar.bz2".to_string(),
            build_id: UNKNOWN.to_string(),
            version: "52.0".to_string(),
            target: "linux-x86_64".to_string(),
            locale: "en-US".to_string(),
            channel: UNKNOWN.to_string(),
            filename: "firefox-52.0.tar.bz2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_returns_configured_updates() {
        let catalog = MockUpdateCatalog::new();
        catalog
            .set_updates(vec![SystemAddon {
                id: "pocket@mozilla.org".to_string(),
                version: "1.0.2".to_string(),
            }])
            .await;

        let updates = catalog.fetch_updates(&release(), &[]).await.unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(catalog.recorded_queries().await.len(), 1);
    }

    #[tokio::test]
    async fn test_error_injection_is_consumed() {
        let catalog = MockUpdateCatalog::new();
        catalog.set_next_error(CatalogError::Unavailable(503)).await;

        assert!(catalog.fetch_updates(&release(), &[]).await.is_err());
        assert!(catalog.fetch_updates(&release(), &[]).await.is_ok());
    }
}
