//! Error types for the simgraph core library.
//!
//! Defines error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::fmt;

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while scoring a pair of nodes.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimilarityError {
    /// Requested node was outside the feature store's bounds.
    #[error("node {node} is out of bounds")]
    OutOfBounds {
        /// The requested node that exceeded the store bounds.
        node: usize,
    },
    /// Compared feature vectors had different dimensions.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Dimensionality of the left-hand vector.
        left: usize,
        /// Dimensionality of the right-hand vector.
        right: usize,
    },
    /// Feature vectors must have positive dimension.
    #[error("feature vectors must have positive dimension")]
    ZeroLength,
    /// A feature contained NaN or an infinity.
    #[error("node {node} has a non-finite feature at index {index}")]
    NonFiniteFeature {
        /// Node whose features were rejected.
        node: usize,
        /// Position of the offending value.
        index: usize,
    },
    /// Combined similarity was built without any component metric.
    #[error("an averaged similarity needs at least one component")]
    NoComponents,
    /// Failure raised by a caller-supplied metric.
    #[error("similarity metric failed: {message}")]
    Custom {
        /// Human-readable description supplied by the metric.
        message: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`SimilarityError`] variants.
    enum SimilarityErrorCode for SimilarityError {
        /// Requested node was outside the feature store's bounds.
        OutOfBounds => OutOfBounds { .. } => "SIMILARITY_OUT_OF_BOUNDS",
        /// Compared feature vectors had different dimensions.
        DimensionMismatch => DimensionMismatch { .. } => "SIMILARITY_DIMENSION_MISMATCH",
        /// Feature vectors must have positive dimension.
        ZeroLength => ZeroLength => "SIMILARITY_ZERO_LENGTH",
        /// A feature contained NaN or an infinity.
        NonFiniteFeature => NonFiniteFeature { .. } => "SIMILARITY_NON_FINITE_FEATURE",
        /// Combined similarity was built without any component metric.
        NoComponents => NoComponents => "SIMILARITY_NO_COMPONENTS",
        /// Failure raised by a caller-supplied metric.
        Custom => Custom { .. } => "SIMILARITY_CUSTOM",
    }
}

/// An error produced while assembling an in-memory [`crate::AdjacencyGraph`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// A relationship endpoint referenced a node outside `0..node_count`.
    #[error("relationship endpoint {node} is out of bounds for {node_count} nodes")]
    EndpointOutOfBounds {
        /// Offending endpoint.
        node: usize,
        /// Number of nodes declared for the graph.
        node_count: usize,
    },
    /// A relationship weight was negative, NaN, or infinite.
    #[error("relationship ({source_node}, {target}) has invalid weight {weight}")]
    InvalidWeight {
        /// Source node of the relationship.
        source_node: usize,
        /// Target node of the relationship.
        target: usize,
        /// Rejected weight.
        weight: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// A relationship endpoint referenced a node outside the graph.
        EndpointOutOfBounds => EndpointOutOfBounds { .. } => "GRAPH_ENDPOINT_OUT_OF_BOUNDS",
        /// A relationship weight was negative, NaN, or infinite.
        InvalidWeight => InvalidWeight { .. } => "GRAPH_INVALID_WEIGHT",
    }
}

/// Error type produced when configuring or running [`crate::Knn`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum KnnError {
    /// The requested neighbour count was zero.
    #[error("top_k must be at least 1 (got {got})")]
    InvalidTopK {
        /// The rejected neighbour count.
        got: usize,
    },
    /// The sample rate fell outside `(0.0, 1.0]`.
    #[error("sample_rate must be in (0.0, 1.0] (got {got})")]
    InvalidSampleRate {
        /// The rejected sample rate.
        got: f64,
    },
    /// The convergence threshold fell outside `(0.0, 1.0]`.
    #[error("delta_threshold must be in (0.0, 1.0] (got {got})")]
    InvalidDeltaThreshold {
        /// The rejected threshold.
        got: f64,
    },
    /// The perturbation rate fell outside `[0.0, 1.0]`.
    #[error("perturbation_rate must be in [0.0, 1.0] (got {got})")]
    InvalidPerturbationRate {
        /// The rejected rate.
        got: f64,
    },
    /// The similarity cutoff was negative or not finite.
    #[error("similarity_cutoff must be finite and non-negative (got {got})")]
    InvalidSimilarityCutoff {
        /// The rejected cutoff.
        got: f64,
    },
    /// Zero worker threads were requested.
    #[error("concurrency must be at least 1 (got {got})")]
    InvalidConcurrency {
        /// The rejected worker count.
        got: usize,
    },
    /// Zero-sized batches were requested.
    #[error("min_batch_size must be at least 1 (got {got})")]
    InvalidMinBatchSize {
        /// The rejected batch size.
        got: usize,
    },
    /// The termination flag was raised before the run completed.
    #[error("knn computation was cancelled during {phase}")]
    Cancelled {
        /// Phase that observed the termination request.
        phase: &'static str,
    },
    /// The similarity metric failed for a pair of nodes.
    #[error("similarity of ({left}, {right}) failed: {error}")]
    Similarity {
        /// First node of the pair.
        left: usize,
        /// Second node of the pair.
        right: usize,
        #[source]
        /// Underlying metric failure.
        error: SimilarityError,
    },
    /// The similarity metric returned NaN or an infinity.
    #[error("similarity metric returned a non-finite value for ({left}, {right})")]
    NonFiniteSimilarity {
        /// First node of the pair.
        left: usize,
        /// Second node of the pair.
        right: usize,
    },
    /// A neighbour list lock was poisoned by a panicking worker.
    #[error("lock poisoned: {resource}")]
    LockPoisoned {
        /// Resource guarded by the poisoned lock.
        resource: &'static str,
    },
    /// The worker pool could not be created.
    #[error("failed to build worker pool: {message}")]
    ThreadPool {
        /// Message reported by the pool builder.
        message: String,
    },
    /// The graph view and the similarity metric disagree about node count.
    #[error("graph has {graph} nodes but the similarity metric covers {similarity}")]
    NodeCountMismatch {
        /// Node count reported by the graph view.
        graph: usize,
        /// Node count reported by the similarity metric.
        similarity: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`KnnError`] variants.
    enum KnnErrorCode for KnnError {
        /// The requested neighbour count was zero.
        InvalidTopK => InvalidTopK { .. } => "KNN_INVALID_TOP_K",
        /// The sample rate fell outside `(0.0, 1.0]`.
        InvalidSampleRate => InvalidSampleRate { .. } => "KNN_INVALID_SAMPLE_RATE",
        /// The convergence threshold fell outside `(0.0, 1.0]`.
        InvalidDeltaThreshold => InvalidDeltaThreshold { .. } => "KNN_INVALID_DELTA_THRESHOLD",
        /// The perturbation rate fell outside `[0.0, 1.0]`.
        InvalidPerturbationRate => InvalidPerturbationRate { .. } => "KNN_INVALID_PERTURBATION_RATE",
        /// The similarity cutoff was negative or not finite.
        InvalidSimilarityCutoff => InvalidSimilarityCutoff { .. } => "KNN_INVALID_SIMILARITY_CUTOFF",
        /// Zero worker threads were requested.
        InvalidConcurrency => InvalidConcurrency { .. } => "KNN_INVALID_CONCURRENCY",
        /// Zero-sized batches were requested.
        InvalidMinBatchSize => InvalidMinBatchSize { .. } => "KNN_INVALID_MIN_BATCH_SIZE",
        /// The termination flag was raised before the run completed.
        Cancelled => Cancelled { .. } => "KNN_CANCELLED",
        /// The similarity metric failed for a pair of nodes.
        SimilarityFailure => Similarity { .. } => "KNN_SIMILARITY_FAILURE",
        /// The similarity metric returned NaN or an infinity.
        NonFiniteSimilarity => NonFiniteSimilarity { .. } => "KNN_NON_FINITE_SIMILARITY",
        /// A neighbour list lock was poisoned by a panicking worker.
        LockPoisoned => LockPoisoned { .. } => "KNN_LOCK_POISONED",
        /// The worker pool could not be created.
        ThreadPool => ThreadPool { .. } => "KNN_THREAD_POOL",
        /// The graph view and the similarity metric disagree about node count.
        NodeCountMismatch => NodeCountMismatch { .. } => "KNN_NODE_COUNT_MISMATCH",
    }
}

impl KnnError {
    /// Retrieve the inner [`SimilarityErrorCode`] when the failure originated in a metric.
    pub const fn similarity_code(&self) -> Option<SimilarityErrorCode> {
        match self {
            Self::Similarity { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Returns whether this error reports a cooperative cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, KnnError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::top_k(KnnError::InvalidTopK { got: 0 }, "KNN_INVALID_TOP_K")]
    #[case::cancelled(KnnError::Cancelled { phase: "join" }, "KNN_CANCELLED")]
    #[case::poisoned(
        KnnError::LockPoisoned { resource: "neighbour list" },
        "KNN_LOCK_POISONED"
    )]
    fn knn_error_codes_are_stable(#[case] error: KnnError, #[case] expected: &str) {
        assert_eq!(error.code().as_str(), expected);
        assert_eq!(error.code().to_string(), expected);
    }

    #[test]
    fn similarity_code_exposes_inner_metric_failure() {
        let error = KnnError::Similarity {
            left: 1,
            right: 2,
            error: SimilarityError::OutOfBounds { node: 2 },
        };
        assert_eq!(
            error.similarity_code(),
            Some(SimilarityErrorCode::OutOfBounds)
        );
        assert_eq!(KnnError::InvalidTopK { got: 0 }.similarity_code(), None);
    }

    #[test]
    fn cancellation_is_reported_explicitly() {
        assert!(KnnError::Cancelled { phase: "split" }.is_cancelled());
        assert!(!KnnError::InvalidConcurrency { got: 0 }.is_cancelled());
    }
}
