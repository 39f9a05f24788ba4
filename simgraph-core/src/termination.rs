//! Cooperative cancellation shared between a caller and a running computation.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::error::{KnnError, Result};

/// Shared stop signal polled between phases and inside parallel loops.
///
/// Clones observe the same flag.
///
/// # Examples
/// ```
/// use simgraph_core::TerminationFlag;
///
/// let flag = TerminationFlag::new();
/// let handle = flag.clone();
/// assert!(flag.is_running());
/// handle.terminate();
/// assert!(!flag.is_running());
/// assert!(flag.assert_running("join").is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TerminationFlag {
    stopped: Arc<AtomicBool>,
}

impl TerminationFlag {
    /// Creates a flag in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the computation stop as soon as possible.
    pub fn terminate(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Returns `false` once [`Self::terminate`] has been called.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::Acquire)
    }

    /// Fails when termination was requested.
    ///
    /// # Errors
    /// Returns [`KnnError::Cancelled`] naming `phase`.
    pub fn assert_running(&self, phase: &'static str) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(KnnError::Cancelled { phase })
        }
    }
}
