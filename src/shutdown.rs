//! Process-wide shutdown coordination for the CLI.
//! A flag set by the signal handler lets multi-entry operations stop
//! between artifacts instead of mid-write. The storage contract itself has
//! no cancellation primitive; this stays in the application layer.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent, signal-handler safe).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

/// Check whether a shutdown has been requested.
#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
