//! Build metadata parsing.

use super::InspectError;

/// Build attributes read from the application metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMetadata {
    pub build_id: String,
    /// Channel label derived from the source repository name; "central"
    /// is normalized to "nightly".
    pub channel: String,
}

/// Parse the `key=value` metadata blob shipped inside a release archive.
///
/// The channel is the segment of the source repository name after the
/// final `mozilla-`, e.g. `.../releases/mozilla-release` -> `release`.
pub fn parse_build_metadata(contents: &str) -> Result<BuildMetadata, InspectError> {
    let mut build_id = None;
    let mut channel = None;

    for line in contents.lines() {
        if let Some(value) = line.strip_prefix("BuildID=") {
            build_id = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("SourceRepository=") {
            channel = value
                .trim()
                .rsplit_once("mozilla-")
                .map(|(_, c)| c.to_string());
        }
    }

    let build_id = build_id.ok_or(InspectError::MetadataMissing("BuildID"))?;
    let mut channel = channel.ok_or(InspectError::MetadataMissing("SourceRepository"))?;
    if channel == "central" {
        channel = "nightly".to_string();
    }

    Ok(BuildMetadata { build_id, channel })
}
