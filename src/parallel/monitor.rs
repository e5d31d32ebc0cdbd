//! Progress and cancellation collaborator.
//!
//! The transform reports progress through a [`StatusMonitor`] and polls the
//! same object for cancellation. Every method must be non-blocking and safe
//! to call from several worker threads at once.
use log::info;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub trait StatusMonitor: Send + Sync {
    /// Announce the total number of steps of the upcoming run.
    fn initialize(&self, total: u64);
    /// Record `steps` more completed steps.
    fn advance(&self, steps: u64);
    /// The run finished successfully.
    fn complete(&self);
    /// Polled by workers between rows and by the engine between passes.
    fn is_aborted(&self) -> bool;
}

/// Monitor that ignores progress and never aborts.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentMonitor;

impl StatusMonitor for SilentMonitor {
    fn initialize(&self, _total: u64) {}
    fn advance(&self, _steps: u64) {}
    fn complete(&self) {}
    fn is_aborted(&self) -> bool {
        false
    }
}

/// Atomic progress counter with an abort flag that any thread may raise.
///
/// Wrap it in an `Arc` to request cancellation from outside the run.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    total: AtomicU64,
    done: AtomicU64,
    aborted: AtomicBool,
    completed: AtomicBool,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    /// `(done, total)` as last reported.
    pub fn progress(&self) -> (u64, u64) {
        (
            self.done.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }

    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::Relaxed)
    }
}

impl StatusMonitor for ProgressCounter {
    fn initialize(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        self.completed.store(false, Ordering::Relaxed);
    }

    fn advance(&self, steps: u64) {
        self.done.fetch_add(steps, Ordering::Relaxed);
    }

    fn complete(&self) {
        self.completed.store(true, Ordering::Relaxed);
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }
}

/// Progress counter that logs every tenth of the run at `info` level.
#[derive(Debug)]
pub struct LogMonitor {
    label: String,
    counter: ProgressCounter,
    last_decile: AtomicU64,
}

impl LogMonitor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            counter: ProgressCounter::new(),
            last_decile: AtomicU64::new(0),
        }
    }

    pub fn counter(&self) -> &ProgressCounter {
        &self.counter
    }
}

impl StatusMonitor for LogMonitor {
    fn initialize(&self, total: u64) {
        self.counter.initialize(total);
        self.last_decile.store(0, Ordering::Relaxed);
        info!("{}: {} steps", self.label, total);
    }

    fn advance(&self, steps: u64) {
        self.counter.advance(steps);
        let (done, total) = self.counter.progress();
        if total == 0 {
            return;
        }
        let decile = (done.min(total) * 10) / total;
        let prev = self.last_decile.fetch_max(decile, Ordering::Relaxed);
        if decile > prev {
            info!("{}: {}%", self.label, decile * 10);
        }
    }

    fn complete(&self) {
        self.counter.complete();
        info!("{}: done", self.label);
    }

    fn is_aborted(&self) -> bool {
        self.counter.is_aborted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_tracks_progress_and_abort() {
        let c = ProgressCounter::new();
        c.initialize(10);
        c.advance(3);
        c.advance(4);
        assert_eq!(c.progress(), (7, 10));
        assert!(!c.is_aborted());
        c.request_abort();
        assert!(c.is_aborted());
        c.complete();
        assert!(c.is_complete());
    }
}
