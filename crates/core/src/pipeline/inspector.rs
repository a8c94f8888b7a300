//! Single-release inspection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex_lite::Regex;
use tracing::{debug, info};

use super::PipelineError;
use crate::archive::{extract, ArchiveError, ArchiveFetcher};
use crate::inspect::{addon_manifest, parse_build_metadata};
use crate::release::{Release, ReleaseInfo};
use crate::update_catalog::UpdateCatalog;

/// Inspects one release end to end: fetch, extract, parse, catalog query.
///
/// Archives are cached under `download_dir/target/locale/filename`; a file
/// already present there is trusted and not re-downloaded. Extraction goes
/// into a per-inspection scratch directory that is removed when the
/// inspection ends, success or not.
pub struct Inspector {
    fetcher: ArchiveFetcher,
    catalog: Arc<dyn UpdateCatalog>,
    download_dir: PathBuf,
    include: Regex,
}

impl Inspector {
    /// Create an inspector; compiles the extraction include pattern.
    pub fn new(
        fetcher: ArchiveFetcher,
        catalog: Arc<dyn UpdateCatalog>,
        download_dir: PathBuf,
        include_pattern: &str,
    ) -> Result<Self, regex_lite::Error> {
        Ok(Self {
            fetcher,
            catalog,
            download_dir,
            include: Regex::new(include_pattern)?,
        })
    }

    /// Run the full inspection of one release.
    pub async fn inspect(&self, release: Release) -> Result<ReleaseInfo, PipelineError> {
        let dest = self
            .download_dir
            .join(&release.target)
            .join(&release.locale)
            .join(&release.filename);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ArchiveError::Io)?;
        }

        if !tokio::fs::try_exists(&dest).await.map_err(ArchiveError::Io)? {
            info!(url = %release.url, "Download release");
            self.fetcher.download(&release.url, &dest).await?;
        }

        info!(archive = %dest.display(), "Extract release");

        // Dropped on every exit path, deleting the extracted files.
        let scratch = tempfile::Builder::new()
            .prefix("addonwatch-inspect-")
            .tempdir()
            .map_err(ArchiveError::Io)?;

        let extracted = extract(&dest, &self.include, scratch.path()).await?;

        let mut release = release;
        let mut builtins = Vec::new();
        for path in &extracted {
            if is_manifest(path) {
                debug!(path = %path.display(), "Inspect addon");
                builtins.push(addon_manifest(path).await?);
            } else {
                debug!(path = %path.display(), "Read build metadata");
                let contents = tokio::fs::read_to_string(path)
                    .await
                    .map_err(crate::inspect::InspectError::Io)?;
                release = release.with_metadata(parse_build_metadata(&contents)?);
            }
        }

        let updates = self.catalog.fetch_updates(&release, &builtins).await?;

        Ok(ReleaseInfo {
            release,
            builtins,
            updates,
        })
    }
}

fn is_manifest(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("xpi")
}
