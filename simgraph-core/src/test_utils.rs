//! Shared test utilities for `simgraph-core`.

use std::sync::atomic::{AtomicU64, Ordering};

use proptest::test_runner::Config as ProptestConfig;
use simgraph_test_support::ci::property_test_profile::ProptestRunProfile;

use crate::{error::SimilarityError, similarity::SimilarityComputer};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROPTEST_CASES` and
/// `SIMGRAPH_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    ProptestRunProfile::load(default_cases, false).config()
}

/// Scalar metric that records how many times it was evaluated.
pub(crate) struct CountingSimilarity {
    values: Vec<f64>,
    symmetric: bool,
    calls: AtomicU64,
}

impl CountingSimilarity {
    pub(crate) fn new(values: Vec<f64>, symmetric: bool) -> Self {
        Self {
            values,
            symmetric,
            calls: AtomicU64::new(0),
        }
    }

    pub(crate) fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl SimilarityComputer for CountingSimilarity {
    fn similarity(&self, left: usize, right: usize) -> Result<f64, SimilarityError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let a = self
            .values
            .get(left)
            .ok_or(SimilarityError::OutOfBounds { node: left })?;
        let b = self
            .values
            .get(right)
            .ok_or(SimilarityError::OutOfBounds { node: right })?;
        Ok(1.0 / (1.0 + (a - b).abs()))
    }

    fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    fn node_count(&self) -> Option<usize> {
        Some(self.values.len())
    }
}
