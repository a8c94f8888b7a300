//! Directory-listing service client.
//!
//! The release tree is served as JSON listing nodes, one per directory:
//! sub-prefixes plus leaf files. Nodes are fetched fresh per request and
//! never cached.

mod http;

pub use http::HttpListingSource;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// One directory node of the release tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingNode {
    /// Sub-directory prefixes, each with its trailing `/`.
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Leaf files in this directory.
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// A leaf file as reported by the listing service.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    pub name: String,
    /// Opaque timestamp string; kept as reported.
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub size: u64,
}

/// Errors that can occur fetching a listing node.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("listing request returned HTTP {0}")]
    Status(u16),

    #[error("listing body is not valid JSON: {0}")]
    Decode(String),
}

/// Source of listing nodes. One implementation speaks HTTP; tests route
/// URLs to canned nodes.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the listing node at `url`. Single attempt, no retries.
    async fn fetch(&self, url: &str) -> Result<ListingNode, ListingError>;
}
