//! Inspection of extracted archive contents.
//!
//! Two artifacts come out of a release archive: a line-oriented build
//! metadata file (build id + release channel) and zero or more bundled
//! extension manifests (`.xpi` zips carrying an `install.rdf`).

mod manifest;
mod metadata;

pub use manifest::{addon_manifest, parse_install_manifest};
pub use metadata::{parse_build_metadata, BuildMetadata};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from parsing archive contents.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("could not read build metadata: missing {0}")]
    MetadataMissing(&'static str),

    #[error("no install.rdf entry in {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("install manifest is malformed: {0}")]
    ManifestInvalid(String),

    #[error("manifest archive unreadable: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("inspection I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
