//! Progress reporting
//!
//! Processors report percentages in `[0, 100]`. The host only ever observes a
//! non-decreasing sequence: values above 100 are clamped and regressions are
//! dropped before they reach the host's sink.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::watch;
use tracing::trace;

/// Sink for progress percentages
pub trait Progress: Send + Sync {
    fn report(&self, percent: u8);
}

impl Progress for watch::Sender<u8> {
    fn report(&self, percent: u8) {
        self.send_replace(percent);
    }
}

/// Adapts a closure into a progress sink
pub struct ProgressFn<F>(pub F);

impl<F> Progress for ProgressFn<F>
where
    F: Fn(u8) + Send + Sync,
{
    fn report(&self, percent: u8) {
        (self.0)(percent)
    }
}

/// Discards every report
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&self, _percent: u8) {}
}

/// Forwards only increasing, clamped percentages to an inner sink
pub struct MonotonicProgress<'a> {
    inner: &'a dyn Progress,
    last: AtomicU8,
}

impl<'a> MonotonicProgress<'a> {
    pub fn new(inner: &'a dyn Progress) -> Self {
        Self {
            inner,
            last: AtomicU8::new(0),
        }
    }

    /// Highest percentage forwarded so far
    pub fn last(&self) -> u8 {
        self.last.load(Ordering::Acquire)
    }
}

impl Progress for MonotonicProgress<'_> {
    fn report(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.last.fetch_max(percent, Ordering::AcqRel);
        if percent > previous {
            self.inner.report(percent);
        } else if percent < previous {
            trace!(percent, previous, "dropped regressing progress report");
        }
    }
}
