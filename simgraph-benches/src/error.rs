//! Benchmark setup error type.
//!
//! Setup functions propagate failures with `?` instead of `.expect()`.

use crate::source::SyntheticError;
use simgraph_core::{GraphError, KnnError, SimilarityError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic source generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Configuration validation or the run itself failed.
    #[error("knn computation failed: {0}")]
    Knn(#[from] KnnError),
    /// The walk graph could not be built.
    #[error("graph construction failed: {0}")]
    Graph(#[from] GraphError),
    /// Scoring a pair for the recall oracle failed.
    #[error("similarity evaluation failed: {0}")]
    Similarity(#[from] SimilarityError),
    /// Writing a report failed.
    #[error("report output failed: {0}")]
    Io(#[from] std::io::Error),
}
