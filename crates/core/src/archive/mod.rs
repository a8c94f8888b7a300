//! Release archive handling: atomic download and whitelist extraction.

mod extract;
mod fetch;

pub use extract::extract;
pub use fetch::ArchiveFetcher;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from downloading or extracting a release archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive transfer failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("archive request returned HTTP {0}")]
    Status(u16),

    #[error("archive I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed archive {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),
}
