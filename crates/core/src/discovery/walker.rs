//! Listing-tree walker.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::config::{DeliveryConfig, NightlyConfig, WalkPolicy};
use crate::listing::{ListingError, ListingNode, ListingSource};
use crate::pipeline::Shutdown;
use crate::release::{Release, UNKNOWN};

use super::selection::{Selection, SelectionError};

/// Errors that can end a discovery walk.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("listing traversal failed: {0}")]
    Listing(#[from] ListingError),

    #[error("no matching nightly build in channel '{0}'")]
    NightlyNotFound(String),

    #[error("discovery cancelled")]
    Cancelled,
}

/// Walks the release tree and emits one [`Release`] per matching archive.
///
/// Two passes: the configured nightly channels (one release each, all
/// attributes captured from the file name), then the dated `releases/`
/// subtree filtered level by level (version, target, locale, file name).
pub struct ReleaseWalker {
    listing: Arc<dyn ListingSource>,
    root_url: String,
    selection: Selection,
    nightly: NightlyConfig,
    policy: WalkPolicy,
}

impl ReleaseWalker {
    /// Create a walker; compiles the selection patterns.
    pub fn new(
        listing: Arc<dyn ListingSource>,
        config: &DeliveryConfig,
    ) -> Result<Self, SelectionError> {
        let selection = Selection::compile(&config.selection, &config.product)?;

        Ok(Self {
            listing,
            root_url: config.root_url.clone(),
            selection,
            nightly: config.nightly.clone(),
            policy: config.walk_policy,
        })
    }

    /// Run the walk, sending discovered releases onto `tx`.
    ///
    /// A low-water mark bounds the dated-release pass: versions lexically
    /// at or below it are skipped (plain string compare; callers supply
    /// zero-padded versions where ordering matters). Every send races the
    /// shutdown signal so a cancelled pipeline never leaks this task.
    pub async fn walk(
        &self,
        low_water_mark: Option<&str>,
        tx: &mpsc::Sender<Release>,
        shutdown: &Shutdown,
    ) -> Result<(), WalkError> {
        let mut cancel_rx = shutdown.subscribe();

        if let Some(mark) = low_water_mark {
            info!(version = mark, "Latest known version");
        }

        // Nightly channels. Only the primary channel's failure is fatal;
        // a missing or unreadable secondary channel skips that channel.
        for channel in &self.nightly.channels {
            if shutdown.is_cancelled() {
                return Err(WalkError::Cancelled);
            }
            match self.nightly_release(channel).await {
                Ok(release) => emit(tx, &mut cancel_rx, release).await?,
                Err(e) if *channel == self.nightly.primary => return Err(e),
                Err(e) => warn!(channel = %channel, error = %e, "Skipping nightly channel"),
            }
        }

        // Dated releases. The root listing failure is always fatal;
        // deeper levels follow the configured walk policy.
        let root = format!("{}releases/", self.root_url);
        let versions = self.listing.fetch(&root).await?;

        for version_prefix in &versions.prefixes {
            if shutdown.is_cancelled() {
                return Err(WalkError::Cancelled);
            }

            let version = version_prefix.trim_end_matches('/');
            if !self.selection.version_matches(version) {
                continue;
            }
            if let Some(mark) = low_water_mark {
                if !mark.is_empty() && version <= mark {
                    continue;
                }
            }

            let targets_url = format!("{}{}", root, version_prefix);
            let Some(targets) = self.fetch_level(&targets_url).await? else {
                continue;
            };

            for target_prefix in &targets.prefixes {
                if !self.selection.target_matches(target_prefix) {
                    continue;
                }
                let target = target_prefix.trim_end_matches('/');

                let locales_url = format!("{}{}", targets_url, target_prefix);
                let Some(locales) = self.fetch_level(&locales_url).await? else {
                    continue;
                };

                for locale_prefix in &locales.prefixes {
                    if !self.selection.locale_matches(locale_prefix) {
                        continue;
                    }
                    let locale = locale_prefix.trim_end_matches('/');

                    let files_url = format!("{}{}", locales_url, locale_prefix);
                    let Some(files) = self.fetch_level(&files_url).await? else {
                        continue;
                    };

                    for file in &files.files {
                        if !self.selection.filename_matches(&file.name) {
                            continue;
                        }
                        let release = Release {
                            url: format!("{}{}", files_url, file.name),
                            build_id: UNKNOWN.to_string(),
                            version: version.to_string(),
                            target: target.to_string(),
                            locale: locale.to_string(),
                            channel: UNKNOWN.to_string(),
                            filename: file.name.clone(),
                        };
                        emit(tx, &mut cancel_rx, release).await?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Fetch one level below the dated-release root, applying the walk
    /// policy: `Abort` surfaces the failure, `SkipBranch` drops the branch.
    async fn fetch_level(&self, url: &str) -> Result<Option<ListingNode>, WalkError> {
        match self.listing.fetch(url).await {
            Ok(node) => Ok(Some(node)),
            Err(e) => match self.policy {
                WalkPolicy::Abort => Err(e.into()),
                WalkPolicy::SkipBranch => {
                    warn!(url = url, error = %e, "Skipping unreadable branch");
                    Ok(None)
                }
            },
        }
    }

    /// Find the one current build of a nightly channel. Version, locale
    /// and target all come from the file name.
    async fn nightly_release(&self, channel: &str) -> Result<Release, WalkError> {
        let url = format!(
            "{}{}",
            self.root_url,
            self.nightly.path_template.replace("{CHANNEL}", channel)
        );
        let node = self.listing.fetch(&url).await?;

        for file in &node.files {
            if let Some((version, locale, target)) = self.selection.nightly_captures(&file.name) {
                return Ok(Release {
                    url: format!("{}{}", url, file.name),
                    build_id: UNKNOWN.to_string(),
                    version,
                    target,
                    locale,
                    channel: channel.to_string(),
                    filename: file.name.clone(),
                });
            }
        }

        Err(WalkError::NightlyNotFound(channel.to_string()))
    }
}

/// Send one release, racing the shutdown signal. A closed queue means the
/// consumers are gone, which only happens on cancellation.
async fn emit(
    tx: &mpsc::Sender<Release>,
    cancel_rx: &mut broadcast::Receiver<()>,
    release: Release,
) -> Result<(), WalkError> {
    debug!(url = %release.url, version = %release.version, "Discovered release");

    tokio::select! {
        res = tx.send(release) => res.map_err(|_| WalkError::Cancelled),
        _ = cancel_rx.recv() => Err(WalkError::Cancelled),
    }
}
