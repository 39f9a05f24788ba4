//! Pluggable similarity metrics and the neighbour-exclusion predicate.
//!
//! The engine only ever talks to a [`SimilarityFunction`], which wraps any
//! [`SimilarityComputer`], pins its symmetry flag for the whole run, and
//! rejects non-finite scores before they reach a neighbour list.

mod filter;
mod metrics;
mod properties;

pub use filter::{FnNeighbourFilter, KnnNeighbourFilter, NeighbourFilter};
pub use metrics::{
    cosine_similarity, euclidean_similarity, jaccard_similarity, overlap_similarity,
    pearson_similarity, scalar_similarity,
};
pub use properties::{
    AverageSimilarity, DenseVectors, ScalarSimilarity, SetMetric, SetSimilarity, VectorMetric,
    VectorSimilarity, VectorSource,
};

use crate::error::{KnnError, SimilarityError};

/// Scores a pair of nodes; higher means more similar.
///
/// # Examples
/// ```
/// use simgraph_core::{SimilarityComputer, SimilarityError};
///
/// struct Parity;
///
/// impl SimilarityComputer for Parity {
///     fn similarity(&self, left: usize, right: usize) -> Result<f64, SimilarityError> {
///         Ok(if left % 2 == right % 2 { 1.0 } else { 0.0 })
///     }
/// }
///
/// assert_eq!(Parity.similarity(2, 4)?, 1.0);
/// assert!(Parity.is_symmetric());
/// # Ok::<(), SimilarityError>(())
/// ```
pub trait SimilarityComputer: Sync {
    /// Computes the similarity of `left` to `right`.
    ///
    /// # Errors
    /// Implementations return [`SimilarityError`] when either node cannot be
    /// scored, for example because its features are missing or malformed.
    fn similarity(&self, left: usize, right: usize) -> Result<f64, SimilarityError>;

    /// Returns whether `similarity(a, b) == similarity(b, a)` for all pairs.
    fn is_symmetric(&self) -> bool {
        true
    }

    /// Returns the number of nodes the metric can score, when known.
    fn node_count(&self) -> Option<usize> {
        None
    }
}

impl<T: SimilarityComputer + ?Sized> SimilarityComputer for &T {
    fn similarity(&self, left: usize, right: usize) -> Result<f64, SimilarityError> {
        (**self).similarity(left, right)
    }

    fn is_symmetric(&self) -> bool {
        (**self).is_symmetric()
    }

    fn node_count(&self) -> Option<usize> {
        (**self).node_count()
    }
}

impl<T: SimilarityComputer + Send + ?Sized> SimilarityComputer for Box<T> {
    fn similarity(&self, left: usize, right: usize) -> Result<f64, SimilarityError> {
        (**self).similarity(left, right)
    }

    fn is_symmetric(&self) -> bool {
        (**self).is_symmetric()
    }

    fn node_count(&self) -> Option<usize> {
        (**self).node_count()
    }
}

/// Adapts a closure into a [`SimilarityComputer`].
///
/// # Examples
/// ```
/// use simgraph_core::{FnSimilarity, SimilarityComputer};
///
/// let directed = FnSimilarity::asymmetric(|a, b| if a < b { 1.0 } else { 0.5 });
/// assert!(!directed.is_symmetric());
/// assert_eq!(directed.similarity(1, 2).expect("closures never fail"), 1.0);
/// ```
#[derive(Clone, Copy)]
pub struct FnSimilarity<F> {
    function: F,
    symmetric: bool,
}

impl<F> FnSimilarity<F>
where
    F: Fn(usize, usize) -> f64 + Sync,
{
    /// Wraps a closure whose score does not depend on argument order.
    #[must_use]
    pub fn new(function: F) -> Self {
        Self {
            function,
            symmetric: true,
        }
    }

    /// Wraps a closure whose score depends on argument order.
    #[must_use]
    pub fn asymmetric(function: F) -> Self {
        Self {
            function,
            symmetric: false,
        }
    }
}

impl<F> SimilarityComputer for FnSimilarity<F>
where
    F: Fn(usize, usize) -> f64 + Sync,
{
    fn similarity(&self, left: usize, right: usize) -> Result<f64, SimilarityError> {
        Ok((self.function)(left, right))
    }

    fn is_symmetric(&self) -> bool {
        self.symmetric
    }
}

/// The engine's view of a metric: fixed symmetry and validated scores.
#[derive(Clone, Copy)]
pub struct SimilarityFunction<'a, S: ?Sized> {
    computer: &'a S,
    symmetric: bool,
}

impl<'a, S: SimilarityComputer + ?Sized> SimilarityFunction<'a, S> {
    /// Wraps `computer`, reading its symmetry flag once.
    #[must_use]
    pub fn new(computer: &'a S) -> Self {
        Self {
            symmetric: computer.is_symmetric(),
            computer,
        }
    }

    /// Returns whether one evaluation may update both endpoints of a pair.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_symmetric(&self) -> bool { self.symmetric }

    /// Scores `left` against `right`.
    ///
    /// # Errors
    /// Returns [`KnnError::Similarity`] when the metric fails and
    /// [`KnnError::NonFiniteSimilarity`] when it yields NaN or an infinity.
    pub fn compute(&self, left: usize, right: usize) -> Result<f64, KnnError> {
        let value = self
            .computer
            .similarity(left, right)
            .map_err(|error| KnnError::Similarity { left, right, error })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(KnnError::NonFiniteSimilarity { left, right })
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn compute_rejects_non_finite_scores(#[case] value: f64) {
        let metric = FnSimilarity::new(move |_, _| value);
        let function = SimilarityFunction::new(&metric);
        let err = function.compute(0, 1).expect_err("non-finite must fail");
        assert_eq!(err, KnnError::NonFiniteSimilarity { left: 0, right: 1 });
    }

    #[test]
    fn compute_wraps_metric_failures_with_the_pair() {
        struct Failing;
        impl SimilarityComputer for Failing {
            fn similarity(&self, _: usize, right: usize) -> Result<f64, SimilarityError> {
                Err(SimilarityError::OutOfBounds { node: right })
            }
        }

        let err = SimilarityFunction::new(&Failing)
            .compute(3, 9)
            .expect_err("metric failure must propagate");
        assert_eq!(
            err,
            KnnError::Similarity {
                left: 3,
                right: 9,
                error: SimilarityError::OutOfBounds { node: 9 },
            }
        );
    }

    #[test]
    fn symmetry_flag_is_taken_from_the_metric() {
        let symmetric = FnSimilarity::new(|_, _| 1.0);
        let asymmetric = FnSimilarity::asymmetric(|_, _| 1.0);
        assert!(SimilarityFunction::new(&symmetric).is_symmetric());
        assert!(!SimilarityFunction::new(&asymmetric).is_symmetric());
    }

    #[test]
    fn boxed_metrics_delegate() {
        let boxed: Box<dyn SimilarityComputer + Send> = Box::new(FnSimilarity::asymmetric(|a, b| {
            (a + b) as f64
        }));
        assert_eq!(boxed.similarity(1, 2).expect("closure never fails"), 3.0);
        assert!(!boxed.is_symmetric());
    }
}
