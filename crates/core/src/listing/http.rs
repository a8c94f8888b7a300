//! HTTP implementation of the listing source.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{ListingError, ListingNode, ListingSource};

/// Listing client backed by the remote directory-listing service.
pub struct HttpListingSource {
    client: Client,
}

impl HttpListingSource {
    /// Create a new listing client with the given request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(crate::USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch(&self, url: &str) -> Result<ListingNode, ListingError> {
        debug!(url = url, "Fetch releases list");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ListingError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ListingError::Decode(e.to_string()))
    }
}
