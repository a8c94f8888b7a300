//! HTTP update catalog client.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{build_update_url, parse_update_manifest, CatalogError, UpdateCatalog};
use crate::release::{Release, SystemAddon};

/// Update catalog client backed by the remote update service.
pub struct HttpUpdateCatalog {
    client: Client,
    url_template: String,
}

impl HttpUpdateCatalog {
    /// Create a new catalog client for the given URL template.
    pub fn new(url_template: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(crate::USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url_template,
        }
    }
}

#[async_trait]
impl UpdateCatalog for HttpUpdateCatalog {
    async fn fetch_updates(
        &self,
        release: &Release,
        builtins: &[SystemAddon],
    ) -> Result<Vec<SystemAddon>, CatalogError> {
        let url = build_update_url(&self.url_template, release);
        debug!(url = %url, builtins = builtins.len(), "Fetch updates info");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/xml")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Unavailable(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_update_manifest(&body)
    }
}
