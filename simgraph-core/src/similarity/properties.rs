//! Metrics that score nodes from stored per-node properties.

use super::{
    SimilarityComputer,
    metrics::{
        cosine_similarity, euclidean_similarity, jaccard_similarity, overlap_similarity,
        pearson_similarity, scalar_similarity,
    },
};
use crate::error::SimilarityError;

/// Random access to one dense feature vector per node.
pub trait VectorSource: Sync {
    /// Returns the number of nodes with a stored vector.
    fn len(&self) -> usize;

    /// Returns whether the source holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the feature vector of `node`.
    ///
    /// # Errors
    /// Returns [`SimilarityError::OutOfBounds`] when `node >= self.len()`.
    fn vector(&self, node: usize) -> Result<&[f32], SimilarityError>;
}

/// Row-major in-memory [`VectorSource`] with a fixed dimension.
///
/// # Examples
/// ```
/// use simgraph_core::{DenseVectors, VectorSource};
///
/// let vectors = DenseVectors::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]])?;
/// assert_eq!(vectors.len(), 2);
/// assert_eq!(vectors.vector(1)?, &[0.0, 1.0]);
/// # Ok::<(), simgraph_core::SimilarityError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DenseVectors {
    dimension: usize,
    values: Vec<f32>,
}

impl DenseVectors {
    /// Wraps a flat row-major buffer.
    ///
    /// # Errors
    /// Returns [`SimilarityError::ZeroLength`] when `dimension` is zero and
    /// [`SimilarityError::DimensionMismatch`] when the buffer is not a whole
    /// number of rows.
    pub fn new(dimension: usize, values: Vec<f32>) -> Result<Self, SimilarityError> {
        if dimension == 0 {
            return Err(SimilarityError::ZeroLength);
        }
        if values.len() % dimension != 0 {
            return Err(SimilarityError::DimensionMismatch {
                left: dimension,
                right: values.len() % dimension,
            });
        }
        Ok(Self { dimension, values })
    }

    /// Builds the store from one vector per node.
    ///
    /// # Errors
    /// Returns [`SimilarityError::ZeroLength`] for empty input or empty rows
    /// and [`SimilarityError::DimensionMismatch`] for ragged rows.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, SimilarityError> {
        let dimension = rows.first().map_or(0, Vec::len);
        if dimension == 0 {
            return Err(SimilarityError::ZeroLength);
        }
        let mut values = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            if row.len() != dimension {
                return Err(SimilarityError::DimensionMismatch {
                    left: dimension,
                    right: row.len(),
                });
            }
            values.extend(row);
        }
        Ok(Self { dimension, values })
    }

    /// Returns the number of features per node.
    #[must_use]
    #[rustfmt::skip]
    pub fn dimension(&self) -> usize { self.dimension }
}

impl VectorSource for DenseVectors {
    fn len(&self) -> usize {
        self.values.len() / self.dimension
    }

    fn vector(&self, node: usize) -> Result<&[f32], SimilarityError> {
        let start = node
            .checked_mul(self.dimension)
            .ok_or(SimilarityError::OutOfBounds { node })?;
        self.values
            .get(start..start + self.dimension)
            .ok_or(SimilarityError::OutOfBounds { node })
    }
}

/// Kernel applied by [`VectorSimilarity`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VectorMetric {
    /// Cosine similarity clamped at zero.
    #[default]
    Cosine,
    /// `1 / (1 + euclidean distance)`.
    Euclidean,
    /// Pearson correlation clamped at zero.
    Pearson,
}

impl VectorMetric {
    fn apply(self, left: &[f32], right: &[f32]) -> f64 {
        match self {
            Self::Cosine => cosine_similarity(left, right),
            Self::Euclidean => euclidean_similarity(left, right),
            Self::Pearson => pearson_similarity(left, right),
        }
    }
}

/// Scores nodes by comparing their dense feature vectors.
///
/// # Examples
/// ```
/// use simgraph_core::{DenseVectors, SimilarityComputer, VectorMetric, VectorSimilarity};
///
/// let vectors = DenseVectors::from_rows(vec![vec![3.0, 4.0], vec![6.0, 8.0]])?;
/// let metric = VectorSimilarity::new(vectors, VectorMetric::Cosine);
/// assert!((metric.similarity(0, 1)? - 1.0).abs() < 1e-9);
/// # Ok::<(), simgraph_core::SimilarityError>(())
/// ```
#[derive(Clone, Debug)]
pub struct VectorSimilarity<S> {
    source: S,
    metric: VectorMetric,
}

impl<S: VectorSource> VectorSimilarity<S> {
    /// Scores vectors from `source` with `metric`.
    #[must_use]
    pub fn new(source: S, metric: VectorMetric) -> Self {
        Self { source, metric }
    }

    /// Returns the configured kernel.
    #[must_use]
    #[rustfmt::skip]
    pub fn metric(&self) -> VectorMetric { self.metric }

    /// Returns the underlying vector store.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> &S { &self.source }

    fn validated(&self, node: usize) -> Result<&[f32], SimilarityError> {
        let vector = self.source.vector(node)?;
        if vector.is_empty() {
            return Err(SimilarityError::ZeroLength);
        }
        if let Some(index) = vector.iter().position(|value| !value.is_finite()) {
            return Err(SimilarityError::NonFiniteFeature { node, index });
        }
        Ok(vector)
    }
}

impl<S: VectorSource> SimilarityComputer for VectorSimilarity<S> {
    fn similarity(&self, left: usize, right: usize) -> Result<f64, SimilarityError> {
        let left_vector = self.validated(left)?;
        let right_vector = self.validated(right)?;
        if left_vector.len() != right_vector.len() {
            return Err(SimilarityError::DimensionMismatch {
                left: left_vector.len(),
                right: right_vector.len(),
            });
        }
        Ok(self.metric.apply(left_vector, right_vector))
    }

    fn node_count(&self) -> Option<usize> {
        Some(self.source.len())
    }
}

/// Scores nodes by a single numeric property: `1 / (1 + |a - b|)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarSimilarity {
    values: Vec<f64>,
}

impl ScalarSimilarity {
    /// Stores one value per node.
    ///
    /// # Errors
    /// Returns [`SimilarityError::NonFiniteFeature`] for NaN or infinite values.
    pub fn new(values: Vec<f64>) -> Result<Self, SimilarityError> {
        if let Some(node) = values.iter().position(|value| !value.is_finite()) {
            return Err(SimilarityError::NonFiniteFeature { node, index: 0 });
        }
        Ok(Self { values })
    }

    fn value(&self, node: usize) -> Result<f64, SimilarityError> {
        self.values
            .get(node)
            .copied()
            .ok_or(SimilarityError::OutOfBounds { node })
    }
}

impl SimilarityComputer for ScalarSimilarity {
    fn similarity(&self, left: usize, right: usize) -> Result<f64, SimilarityError> {
        Ok(scalar_similarity(self.value(left)?, self.value(right)?))
    }

    fn node_count(&self) -> Option<usize> {
        Some(self.values.len())
    }
}

/// Kernel applied by [`SetSimilarity`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SetMetric {
    /// Intersection over union.
    #[default]
    Jaccard,
    /// Intersection over the smaller set.
    Overlap,
}

/// Scores nodes by comparing sets of ids, such as tags or neighbour ids.
///
/// # Examples
/// ```
/// use simgraph_core::{SetMetric, SetSimilarity, SimilarityComputer};
///
/// let sets = SetSimilarity::new(vec![vec![3, 1, 2], vec![2, 3, 4, 4]], SetMetric::Jaccard);
/// assert_eq!(sets.similarity(0, 1)?, 0.5);
/// # Ok::<(), simgraph_core::SimilarityError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SetSimilarity {
    sets: Vec<Vec<u64>>,
    metric: SetMetric,
}

impl SetSimilarity {
    /// Stores one id set per node; ids are sorted and deduplicated.
    #[must_use]
    pub fn new(mut sets: Vec<Vec<u64>>, metric: SetMetric) -> Self {
        for set in &mut sets {
            set.sort_unstable();
            set.dedup();
        }
        Self { sets, metric }
    }

    fn set(&self, node: usize) -> Result<&[u64], SimilarityError> {
        self.sets
            .get(node)
            .map(Vec::as_slice)
            .ok_or(SimilarityError::OutOfBounds { node })
    }
}

impl SimilarityComputer for SetSimilarity {
    fn similarity(&self, left: usize, right: usize) -> Result<f64, SimilarityError> {
        let (left, right) = (self.set(left)?, self.set(right)?);
        Ok(match self.metric {
            SetMetric::Jaccard => jaccard_similarity(left, right),
            SetMetric::Overlap => overlap_similarity(left, right),
        })
    }

    fn node_count(&self) -> Option<usize> {
        Some(self.sets.len())
    }
}

/// Arithmetic mean of several component metrics.
///
/// The combination is symmetric only when every component is.
pub struct AverageSimilarity {
    components: Vec<Box<dyn SimilarityComputer + Send>>,
}

impl AverageSimilarity {
    /// Averages `components`.
    ///
    /// # Errors
    /// Returns [`SimilarityError::NoComponents`] when `components` is empty.
    pub fn new(
        components: Vec<Box<dyn SimilarityComputer + Send>>,
    ) -> Result<Self, SimilarityError> {
        if components.is_empty() {
            return Err(SimilarityError::NoComponents);
        }
        Ok(Self { components })
    }
}

impl SimilarityComputer for AverageSimilarity {
    fn similarity(&self, left: usize, right: usize) -> Result<f64, SimilarityError> {
        let mut total = 0.0;
        for component in &self.components {
            total += component.similarity(left, right)?;
        }
        Ok(total / self.components.len() as f64)
    }

    fn is_symmetric(&self) -> bool {
        self.components.iter().all(|component| component.is_symmetric())
    }

    fn node_count(&self) -> Option<usize> {
        self.components
            .iter()
            .filter_map(|component| component.node_count())
            .min()
    }
}
