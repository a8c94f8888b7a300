//! Atomic archive download.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::ArchiveError;

/// Downloads release archives. The body is streamed into a `.part` file
/// that is renamed onto the destination only on full success, so a
/// partially-downloaded archive is never visible under the final name.
/// No retries, no resume.
pub struct ArchiveFetcher {
    client: Client,
}

impl ArchiveFetcher {
    /// Create a new fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(crate::USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Download `url` to `dest`.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<(), ArchiveError> {
        debug!(url = url, dest = %dest.display(), "Download release archive");

        let part = part_path(dest);
        match self.stream_to(url, &part).await {
            Ok(()) => {
                tokio::fs::rename(&part, dest).await?;
                Ok(())
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                Err(e)
            }
        }
    }

    async fn stream_to(&self, url: &str, part: &Path) -> Result<(), ArchiveError> {
        let mut response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ArchiveError::Status(response.status().as_u16()));
        }

        let mut file = File::create(part).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
