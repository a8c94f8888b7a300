//! Pipeline runner.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use super::{Inspector, PipelineError, Shutdown};
use crate::config::PipelineConfig;
use crate::discovery::{ReleaseWalker, WalkError};
use crate::release::{Release, ReleaseInfo};
use crate::store::{record_id, PublishOutcome, VersionStore};

/// Queue depths. Kept minimal so producers block until a consumer is
/// actually ready, which keeps cancellation races short.
const RELEASE_QUEUE_DEPTH: usize = 1;
const RESULT_QUEUE_DEPTH: usize = 1;

/// Outcome of a completed pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Records created in the store.
    pub published: usize,
    /// Records the store already had.
    pub already_known: usize,
}

/// One full discovery -> inspection -> publication run.
pub struct Pipeline {
    walker: Arc<ReleaseWalker>,
    inspector: Arc<Inspector>,
    store: Arc<dyn VersionStore>,
    workers: usize,
}

impl Pipeline {
    pub fn new(
        walker: ReleaseWalker,
        inspector: Inspector,
        store: Arc<dyn VersionStore>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            walker: Arc::new(walker),
            inspector: Arc::new(inspector),
            store,
            workers: config.workers,
        }
    }

    /// Run the pipeline to completion.
    ///
    /// Resolves the low-water mark, then runs one walker task, a fixed
    /// pool of inspector workers, and the publisher loop on the calling
    /// task. The first fatal error cancels the run and is returned after
    /// every task has wound down; in-flight scratch directories are
    /// cleaned up by their owners on the way out.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let low_water = self.store.last_published().await?;

        let shutdown = Arc::new(Shutdown::new());
        let (release_tx, release_rx) = mpsc::channel::<Release>(RELEASE_QUEUE_DEPTH);
        let (result_tx, mut result_rx) = mpsc::channel::<ReleaseInfo>(RESULT_QUEUE_DEPTH);

        // Discovery task. Closing the release queue (by dropping the
        // sender) is what lets idle workers exit.
        let walk_handle = tokio::spawn({
            let walker = Arc::clone(&self.walker);
            let shutdown = Arc::clone(&shutdown);
            let low_water = low_water.clone();
            async move {
                match walker.walk(low_water.as_deref(), &release_tx, &shutdown).await {
                    Ok(()) => debug!("Discovery complete"),
                    Err(WalkError::Cancelled) => debug!("Discovery cancelled"),
                    Err(e) => shutdown.fire(e.into()),
                }
            }
        });

        // Inspector pool. Workers take releases one at a time from the
        // shared queue; each owns its release exclusively for the whole
        // inspection.
        let release_rx = Arc::new(Mutex::new(release_rx));
        let worker_handles: Vec<_> = (0..self.workers)
            .map(|worker_id| {
                let queue = Arc::clone(&release_rx);
                let inspector = Arc::clone(&self.inspector);
                let shutdown = Arc::clone(&shutdown);
                let result_tx = result_tx.clone();

                tokio::spawn(async move {
                    let mut cancel_rx = shutdown.subscribe();
                    loop {
                        if shutdown.is_cancelled() {
                            break;
                        }
                        let release = {
                            let mut queue = queue.lock().await;
                            tokio::select! {
                                release = queue.recv() => release,
                                _ = cancel_rx.recv() => None,
                            }
                        };
                        let Some(release) = release else { break };
                        if shutdown.is_cancelled() {
                            break;
                        }

                        debug!(worker = worker_id, url = %release.url, "Inspect release");
                        match inspector.inspect(release).await {
                            Ok(info) => {
                                let delivered = tokio::select! {
                                    res = result_tx.send(info) => res.is_ok(),
                                    _ = cancel_rx.recv() => false,
                                };
                                if !delivered {
                                    debug!(worker = worker_id, "Inspection cancelled");
                                    break;
                                }
                            }
                            Err(e) => {
                                shutdown.fire(e);
                                break;
                            }
                        }
                    }
                })
            })
            .collect();
        drop(result_tx);

        // Publisher. Runs on the calling task; the store's conditional
        // create makes republication a no-op, and the per-run id set keeps
        // one run from writing the same record twice.
        let mut report = PipelineReport::default();
        let mut seen = HashSet::new();
        while let Some(info) = result_rx.recv().await {
            let id = record_id(&info.release.url);
            if !seen.insert(id) {
                debug!(url = %info.release.url, "Duplicate release in run, skipping");
                continue;
            }
            match self.store.publish(&info).await {
                Ok(PublishOutcome::Created) => {
                    info!(url = %info.release.url, version = %info.release.version, "Published release info");
                    report.published += 1;
                }
                Ok(PublishOutcome::AlreadyExists) => {
                    debug!(url = %info.release.url, "Release already published");
                    report.already_known += 1;
                }
                Err(e) => {
                    shutdown.fire(e.into());
                    break;
                }
            }
        }

        let _ = walk_handle.await;
        join_all(worker_handles).await;

        match shutdown.take_error() {
            Some(error) => Err(error),
            None => Ok(report),
        }
    }
}
