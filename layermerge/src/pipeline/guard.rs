//! Single-run guard.

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds the busy flag for the duration of a run.
///
/// Acquiring fails while another guard on the same flag is alive; the flag
/// is released on drop, including when a stage panics.
pub(crate) struct RunGuard<'a> {
    busy: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    pub(crate) fn acquire(busy: &'a AtomicBool) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { busy })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
