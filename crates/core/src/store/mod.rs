//! Remote version store.
//!
//! The store keeps one record per release, keyed by a digest of the
//! release's canonical URL so republishing the same release always targets
//! the same record.

mod kinto;

pub use kinto::KintoStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::release::ReleaseInfo;

/// Errors from reading or writing the version store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store read returned HTTP {0}")]
    Status(u16),

    #[error("store response is not valid JSON: {0}")]
    Decode(String),

    #[error("store rejected publish with HTTP {0}")]
    Rejected(u16),
}

/// Result of an idempotent publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new record was created.
    Created,
    /// The record already existed; nothing was modified.
    AlreadyExists,
}

/// Trait for version store backends.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// The most recently published release version, or `None` when the
    /// store holds no records. Bounds re-discovery as the low-water mark.
    async fn last_published(&self) -> Result<Option<String>, StoreError>;

    /// Idempotent conditional create of one release record.
    async fn publish(&self, info: &ReleaseInfo) -> Result<PublishOutcome, StoreError>;
}

/// Stable record identifier: lowercase-hex md5 of the release URL.
pub fn record_id(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_is_stable() {
        let a = record_id("https://archive.example/firefox-52.0.tar.bz2");
        let b = record_id("https://archive.example/firefox-52.0.tar.bz2");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_record_id_differs_per_url() {
        let a = record_id("https://archive.example/firefox-52.0.tar.bz2");
        let b = record_id("https://archive.example/firefox-52.0.1.tar.bz2");
        assert_ne!(a, b);
    }
}
