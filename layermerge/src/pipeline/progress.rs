//! Progress and status reporting.

use std::path::PathBuf;

/// Receives percent-complete values in `[0, 100]`.
pub trait ProgressSink {
    fn report(&self, percent: u8);
}

impl<F: Fn(u8)> ProgressSink for F {
    fn report(&self, percent: u8) {
        self(percent)
    }
}

/// Terminal outcome of a run, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStatus {
    Success {
        message: String,
        /// Written layer, for exports
        output: Option<PathBuf>,
    },
    Failure {
        reason: String,
    },
}

impl PipelineStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Receives the terminal status of each run.
pub trait StatusSink {
    fn report(&self, status: &PipelineStatus);
}

impl<F: Fn(&PipelineStatus)> StatusSink for F {
    fn report(&self, status: &PipelineStatus) {
        self(status)
    }
}

/// A sink that ignores progress and status.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressSink for Silent {
    fn report(&self, _percent: u8) {}
}

impl StatusSink for Silent {
    fn report(&self, _status: &PipelineStatus) {}
}

/// Milestones reported as stages complete.
pub mod milestones {
    pub const LOADED: u8 = 20;
    pub const RESOLVED: u8 = 40;
    pub const MERGED: u8 = 60;
    pub const PRODUCED: u8 = 80;
    pub const DONE: u8 = 100;
}

/// Forwards progress to a sink, never letting it go backwards.
pub(crate) struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    last: u8,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink, last: 0 }
    }

    pub(crate) fn advance(&mut self, percent: u8) {
        let percent = percent.min(100).max(self.last);
        self.last = percent;
        self.sink.report(percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_tracker_is_monotonic_and_clamped() {
        let seen = RefCell::new(Vec::new());
        let sink = |p: u8| seen.borrow_mut().push(p);
        let mut tracker = ProgressTracker::new(&sink);
        tracker.advance(40);
        tracker.advance(20);
        tracker.advance(250);
        assert_eq!(*seen.borrow(), vec![40, 40, 100]);
    }

    #[test]
    fn test_closure_status_sink() {
        let seen = RefCell::new(None);
        let sink = |s: &PipelineStatus| *seen.borrow_mut() = Some(s.clone());
        StatusSink::report(
            &sink,
            &PipelineStatus::Failure {
                reason: "boom".into(),
            },
        );
        assert!(!seen.borrow().as_ref().unwrap().is_success());
    }
}
