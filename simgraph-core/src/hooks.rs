//! Progress reporting and instrumentation hooks invoked by the engine.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

/// Receives phase boundaries and work advancement from a running computation.
///
/// Methods are called concurrently from worker tasks and must not block.
pub trait ProgressTracker: Sync {
    /// A phase expecting `volume` units of work is starting.
    fn begin_subtask(&self, _phase: &'static str, _volume: u64) {}

    /// `amount` units of work of the current phase completed.
    fn log_progress(&self, _amount: u64) {}

    /// The named phase finished.
    fn end_subtask(&self, _phase: &'static str) {}
}

/// Discards all progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProgress;

impl ProgressTracker for NoopProgress {}

/// Reports progress as `tracing` events.
///
/// Phase boundaries are logged at `info`; advancement is logged at `debug`
/// whenever the current phase crosses another tenth of its volume.
#[derive(Debug, Default)]
pub struct TracingProgress {
    volume: AtomicU64,
    done: AtomicU64,
}

impl TracingProgress {
    /// Creates a tracker with no active phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressTracker for TracingProgress {
    fn begin_subtask(&self, phase: &'static str, volume: u64) {
        self.volume.store(volume, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        info!(phase, volume, "phase started");
    }

    fn log_progress(&self, amount: u64) {
        let volume = self.volume.load(Ordering::Relaxed);
        let before = self.done.fetch_add(amount, Ordering::Relaxed);
        if volume == 0 {
            return;
        }
        let after = before.saturating_add(amount).min(volume);
        let step = (volume / 10).max(1);
        if before / step != after / step {
            let percent = after.saturating_mul(100) / volume;
            debug!(done = after, volume, percent, "phase progress");
        }
    }

    fn end_subtask(&self, phase: &'static str) {
        let done = self.done.load(Ordering::Relaxed);
        info!(phase, done, "phase finished");
    }
}

/// Observes neighbour candidates as the engine scores them.
///
/// Closures `Fn(usize, &[usize])` implement this trait and only see the
/// initial samples.
pub trait NeighbourConsumer: Sync {
    /// Called once per node with the ids admitted by the initial sampler.
    fn offer(&self, node: usize, neighbours: &[usize]);

    /// Called for every candidate scored for `node`'s list, whether or not
    /// the list admitted it. Symmetric joins report both directions.
    fn consider(&self, _node: usize, _candidate: usize, _similarity: f64) {}
}

/// Ignores every offer.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopConsumer;

impl NeighbourConsumer for NoopConsumer {
    fn offer(&self, _node: usize, _neighbours: &[usize]) {}
}

impl<F> NeighbourConsumer for F
where
    F: Fn(usize, &[usize]) + Sync,
{
    fn offer(&self, node: usize, neighbours: &[usize]) {
        self(node, neighbours);
    }
}
