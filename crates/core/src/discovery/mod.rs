//! Release discovery.
//!
//! A walker traverses the listing tree (nightly channels plus the dated
//! `releases/` subtree), filters every level through the configured
//! selection predicates, and emits one [`Release`](crate::Release) per
//! matching archive onto the pipeline's release queue.

mod selection;
mod walker;

pub use selection::{Selection, SelectionError};
pub use walker::{ReleaseWalker, WalkError};
