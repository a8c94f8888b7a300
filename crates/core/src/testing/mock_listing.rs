//! Mock listing source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::listing::{FileEntry, ListingError, ListingNode, ListingSource};

/// Mock implementation of the [`ListingSource`] trait.
///
/// Routes URLs to canned listing nodes, records every fetch for
/// assertions, and can fail specific URLs. Unknown URLs answer HTTP 404.
#[derive(Default)]
pub struct MockListingSource {
    nodes: Arc<RwLock<HashMap<String, ListingNode>>>,
    failing: Arc<RwLock<HashMap<String, u16>>>,
    fetches: Arc<RwLock<Vec<String>>>,
}

impl MockListingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `node` at `url`.
    pub async fn set_node(&self, url: &str, node: ListingNode) {
        self.nodes.write().await.insert(url.to_string(), node);
    }

    /// Serve a directory node with the given prefixes and no files.
    pub async fn set_prefixes(&self, url: &str, prefixes: &[&str]) {
        self.set_node(
            url,
            ListingNode {
                prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
                files: Vec::new(),
            },
        )
        .await;
    }

    /// Serve a leaf node with the given file names and no prefixes.
    pub async fn set_files(&self, url: &str, names: &[&str]) {
        self.set_node(
            url,
            ListingNode {
                prefixes: Vec::new(),
                files: names
                    .iter()
                    .map(|name| FileEntry {
                        name: name.to_string(),
                        last_modified: String::new(),
                        size: 0,
                    })
                    .collect(),
            },
        )
        .await;
    }

    /// Answer `status` for `url` instead of a node.
    pub async fn fail_url(&self, url: &str, status: u16) {
        self.failing.write().await.insert(url.to_string(), status);
    }

    /// URLs fetched so far, in order.
    pub async fn recorded_fetches(&self) -> Vec<String> {
        self.fetches.read().await.clone()
    }
}

#[async_trait]
impl ListingSource for MockListingSource {
    async fn fetch(&self, url: &str) -> Result<ListingNode, ListingError> {
        self.fetches.write().await.push(url.to_string());

        if let Some(status) = self.failing.read().await.get(url) {
            return Err(ListingError::Status(*status));
        }

        match self.nodes.read().await.get(url) {
            Some(node) => Ok(node.clone()),
            None => Err(ListingError::Status(404)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_routes_and_records() {
        let listing = MockListingSource::new();
        listing.set_prefixes("https://example.test/", &["52.0/"]).await;

        let node = listing.fetch("https://example.test/").await.unwrap();
        assert_eq!(node.prefixes, vec!["52.0/"]);

        let err = listing.fetch("https://example.test/other/").await.unwrap_err();
        assert!(matches!(err, ListingError::Status(404)));

        assert_eq!(listing.recorded_fetches().await.len(), 2);
    }
}
