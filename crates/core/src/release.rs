//! Domain types for discovered releases.

use serde::{Deserialize, Serialize};

use crate::inspect::BuildMetadata;

/// Placeholder value for fields that are only known after inspection.
pub const UNKNOWN: &str = "unknown";

/// One discovered build artifact, identified by version/target/locale.
///
/// The walker creates releases with `build_id` and `channel` set to
/// [`UNKNOWN`] (nightly discovery supplies a known channel); both become
/// authoritative once the build metadata inside the archive has been
/// parsed. Wire field names (`buildId`, `lang`) follow the store's record
/// schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Canonical download URL; also the basis of the store record id.
    pub url: String,
    #[serde(rename = "buildId")]
    pub build_id: String,
    pub version: String,
    pub target: String,
    #[serde(rename = "lang")]
    pub locale: String,
    pub channel: String,
    pub filename: String,
}

impl Release {
    /// Returns a copy of this release with the build id and channel taken
    /// from parsed build metadata. Consumes `self`: the half-populated
    /// value is not meant to outlive inspection.
    pub fn with_metadata(self, metadata: BuildMetadata) -> Self {
        Self {
            build_id: metadata.build_id,
            channel: metadata.channel,
            ..self
        }
    }
}

/// An extension bundled inside a release archive ("builtin") or offered by
/// the update catalog for that release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemAddon {
    pub id: String,
    pub version: String,
}

/// The merged record published to the store, one per release.
///
/// Immutable once built. `builtins` keeps the extraction iteration order so
/// repeated inspections of the same archive produce identical records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub release: Release,
    pub builtins: Vec<SystemAddon>,
    pub updates: Vec<SystemAddon>,
}
