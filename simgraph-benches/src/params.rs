//! Benchmark parameter types.

use std::fmt;

use simgraph_core::SamplerKind;

/// Parameters for one NN-Descent benchmark run.
#[derive(Clone, Debug)]
pub struct KnnBenchParams {
    /// Number of nodes in the dataset.
    pub point_count: usize,
    /// Neighbours kept per node.
    pub top_k: usize,
    /// Initial sampler.
    pub sampler: SamplerKind,
}

impl fmt::Display for KnnBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={},k={},{}",
            self.point_count, self.top_k, self.sampler
        )
    }
}

/// Parameters for a worker-scaling benchmark run.
#[derive(Clone, Debug)]
pub struct ConcurrencyBenchParams {
    /// Number of nodes in the dataset.
    pub point_count: usize,
    /// Worker threads.
    pub concurrency: usize,
}

impl fmt::Display for ConcurrencyBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},threads={}", self.point_count, self.concurrency)
    }
}
