//! The discovery -> inspection -> publication pipeline.
//!
//! One walker task produces candidate releases, a fixed pool of inspector
//! workers consumes them, and a single publisher drains the results. The
//! tasks share two bounded queues and a one-shot shutdown latch; the first
//! fatal error anywhere cancels everything and is reported to the caller.

mod inspector;
mod runner;
mod signal;

pub use inspector::Inspector;
pub use runner::{Pipeline, PipelineReport};
pub use signal::Shutdown;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::discovery::WalkError;
use crate::inspect::InspectError;
use crate::store::StoreError;
use crate::update_catalog::CatalogError;

/// First fatal error of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("discovery failed: {0}")]
    Walk(#[from] WalkError),

    #[error("archive handling failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("release inspection failed: {0}")]
    Inspect(#[from] InspectError),

    #[error("update catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("pipeline cancelled")]
    Cancelled,
}
