//! Shared cancellation signal with first-error-wins capture.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::sync::broadcast;

use super::PipelineError;

/// One-shot pipeline shutdown latch.
///
/// The first call to [`fire`](Shutdown::fire) stores its error and wakes
/// every subscriber; later calls are no-ops apart from waking subscribers
/// again. Tasks must subscribe before the pipeline starts so a fired
/// signal is never missed, and should check [`is_cancelled`]
/// (Shutdown::is_cancelled) before starting new work.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    cancelled: AtomicBool,
    first_error: Mutex<Option<PipelineError>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);

        Self {
            tx,
            cancelled: AtomicBool::new(false),
            first_error: Mutex::new(None),
        }
    }

    /// Subscribe to the cancellation broadcast.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Record a fatal error and cancel the pipeline. Idempotent: only the
    /// first error is retained.
    pub fn fire(&self, error: PipelineError) {
        {
            let mut slot = self.first_error.lock().expect("error slot poisoned");
            if slot.is_none() {
                *slot = Some(error);
            }
        }
        self.cancelled.store(true, Ordering::SeqCst);
        // No receivers is fine: everyone may already have exited.
        let _ = self.tx.send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Take the stored error, leaving the latch cancelled.
    pub fn take_error(&self) -> Option<PipelineError> {
        self.first_error.lock().expect("error slot poisoned").take()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
