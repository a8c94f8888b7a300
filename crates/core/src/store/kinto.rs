//! Kinto-compatible record store client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::{record_id, PublishOutcome, StoreError, VersionStore};
use crate::config::StoreConfig;
use crate::release::ReleaseInfo;

/// Version store backed by a Kinto-style record API
/// (`/buckets/{bucket}/collections/{collection}/records`).
pub struct KintoStore {
    client: Client,
    base_url: String,
    bucket: String,
    collection: String,
    auth: Option<String>,
    channel_filter: Option<String>,
}

/// Partial record shape for the low-water-mark read; tolerates records
/// written by earlier schema versions.
#[derive(Debug, Deserialize)]
struct RecordsResponse {
    data: Vec<RecordData>,
}

#[derive(Debug, Deserialize)]
struct RecordData {
    release: RecordRelease,
}

#[derive(Debug, Deserialize)]
struct RecordRelease {
    version: String,
}

impl KintoStore {
    /// Create a new store client from configuration.
    pub fn new(config: &StoreConfig, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(crate::USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            collection: config.collection.clone(),
            auth: config.auth.clone(),
            channel_filter: config.channel_filter.clone(),
        }
    }

    fn records_url(&self) -> String {
        format!(
            "{}/buckets/{}/collections/{}/records",
            self.base_url, self.bucket, self.collection
        )
    }
}

#[async_trait]
impl VersionStore for KintoStore {
    async fn last_published(&self) -> Result<Option<String>, StoreError> {
        let mut url = format!("{}?_sort=-release.version&_limit=1", self.records_url());
        if let Some(channel) = &self.channel_filter {
            url.push_str(&format!("&release.channel={}", channel));
        }

        debug!(url = %url, "Read last published release");

        let mut request = self.client.get(&url);
        if let Some(auth) = &self.auth {
            request = request.header("Authorization", auth);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let records: RecordsResponse =
            serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(records.data.into_iter().next().map(|r| r.release.version))
    }

    async fn publish(&self, info: &ReleaseInfo) -> Result<PublishOutcome, StoreError> {
        let url = format!("{}/{}", self.records_url(), record_id(&info.release.url));
        info!(url = %url, "Publish release info");

        let mut request = self
            .client
            .put(&url)
            .header("If-None-Match", "*")
            .json(&json!({ "data": info }));
        if let Some(auth) = &self.auth {
            request = request.header("Authorization", auth);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::CREATED => Ok(PublishOutcome::Created),
            StatusCode::PRECONDITION_FAILED => Ok(PublishOutcome::AlreadyExists),
            status => Err(StoreError::Rejected(status.as_u16())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_url() {
        let store = KintoStore::new(&StoreConfig::default(), Duration::from_secs(5));
        assert_eq!(
            store.records_url(),
            "https://kinto-ota.dev.mozaws.net/v1/buckets/systemaddons/collections/versions/records"
        );
    }

    #[test]
    fn test_records_response_tolerates_extra_fields() {
        let body = r#"{
            "data": [
                {
                    "id": "abc",
                    "last_modified": 1490000000000,
                    "release": {"version": "52.0", "channel": "release", "extra": true},
                    "builtins": []
                }
            ]
        }"#;
        let parsed: RecordsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data[0].release.version, "52.0");
    }

    #[test]
    fn test_records_response_empty() {
        let parsed: RecordsResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(parsed.data.is_empty());
    }
}
