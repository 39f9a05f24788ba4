//! Seeded synthetic inputs for benchmarking.
//!
//! Vectors are returned as [`DenseVectors`] so they plug straight into
//! [`simgraph_core::VectorSimilarity`].

use std::f32::consts::PI;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use simgraph_core::{AdjacencyGraph, DenseVectors, GraphError};

/// Errors that may occur during synthetic source generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyntheticError {
    /// The requested point count was zero.
    #[error("point count must be greater than zero")]
    ZeroPoints,
    /// The requested dimension count was zero.
    #[error("dimension count must be greater than zero")]
    ZeroDimensions,
    /// Blob generation needs at least one cluster.
    #[error("cluster count must be greater than zero")]
    ZeroClusters,
    /// A floating-point parameter was non-finite or non-positive.
    #[error("parameter `{parameter}` must be finite and positive")]
    InvalidFloatParameter {
        /// Name of the rejected parameter.
        parameter: &'static str,
    },
}

/// Configuration for uniformly distributed vectors in `[-1, 1)`.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each vector.
    pub dimensions: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Configuration for isotropic Gaussian blobs.
#[derive(Clone, Debug)]
pub struct GaussianBlobConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each vector.
    pub dimensions: usize,
    /// Number of clusters; points are assigned round-robin.
    pub cluster_count: usize,
    /// Radius of the circle the centroids are placed on.
    pub separation: f32,
    /// Standard deviation around each centroid.
    pub spread: f32,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Generates uniformly distributed vectors.
///
/// # Examples
/// ```
/// use simgraph_benches::source::{SyntheticConfig, uniform_vectors};
/// use simgraph_core::VectorSource;
///
/// let config = SyntheticConfig { point_count: 10, dimensions: 4, seed: 42 };
/// let vectors = uniform_vectors(&config).expect("valid config");
/// assert_eq!(vectors.len(), 10);
/// ```
///
/// # Errors
/// Returns [`SyntheticError`] for zero points or dimensions.
pub fn uniform_vectors(config: &SyntheticConfig) -> Result<DenseVectors, SyntheticError> {
    validate_shape(config.point_count, config.dimensions)?;
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let values = (0..config.point_count * config.dimensions)
        .map(|_| rng.gen_range(-1.0_f32..1.0_f32))
        .collect();
    into_vectors(config.dimensions, values)
}

/// Generates Gaussian blobs around centroids spaced on a circle.
///
/// The first two axes carry the circle; remaining centroid coordinates are
/// drawn within `±0.2 * separation`.
///
/// # Errors
/// Returns [`SyntheticError`] for an empty shape, zero clusters, or a
/// non-positive `separation` or `spread`.
pub fn gaussian_blobs(config: &GaussianBlobConfig) -> Result<DenseVectors, SyntheticError> {
    validate_shape(config.point_count, config.dimensions)?;
    if config.cluster_count == 0 {
        return Err(SyntheticError::ZeroClusters);
    }
    validate_positive(config.separation, "separation")?;
    validate_positive(config.spread, "spread")?;

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let centroids: Vec<Vec<f32>> = (0..config.cluster_count)
        .map(|cluster| {
            let angle = (cluster as f32 / config.cluster_count as f32) * (2.0 * PI);
            let mut centroid = vec![0.0_f32; config.dimensions];
            if let Some(value) = centroid.get_mut(0) {
                *value = config.separation * angle.cos();
            }
            if let Some(value) = centroid.get_mut(1) {
                *value = config.separation * angle.sin();
            }
            let bound = 0.2 * config.separation;
            for value in centroid.iter_mut().skip(2) {
                *value = rng.gen_range(-bound..bound);
            }
            centroid
        })
        .collect();

    let mut values = Vec::with_capacity(config.point_count * config.dimensions);
    for centroid in centroids.iter().cycle().take(config.point_count) {
        for &coordinate in centroid {
            values.push(coordinate + standard_normal_sample(&mut rng) * config.spread);
        }
    }
    into_vectors(config.dimensions, values)
}

/// Builds an undirected ring where each node links to its `reach` nearest
/// ids on either side.
///
/// # Errors
/// Returns [`GraphError`] only if the ring references an unknown node, which
/// cannot happen for `point_count > 0`.
pub fn ring_graph(point_count: usize, reach: usize) -> Result<AdjacencyGraph, GraphError> {
    let edges = (0..point_count).flat_map(move |node| {
        (1..=reach).flat_map(move |step| {
            [
                (node, (node + step) % point_count),
                (node, (node + point_count - step % point_count) % point_count),
            ]
        })
    });
    AdjacencyGraph::from_unweighted_edges(
        point_count,
        edges.filter(|(source, target)| source != target),
    )
}

fn standard_normal_sample(rng: &mut SmallRng) -> f32 {
    let u1 = rng.gen_range(f32::EPSILON..1.0_f32);
    let u2 = rng.gen_range(0.0_f32..1.0_f32);
    (-2.0_f32 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

const fn validate_shape(point_count: usize, dimensions: usize) -> Result<(), SyntheticError> {
    if point_count == 0 {
        return Err(SyntheticError::ZeroPoints);
    }
    if dimensions == 0 {
        return Err(SyntheticError::ZeroDimensions);
    }
    Ok(())
}

fn validate_positive(value: f32, parameter: &'static str) -> Result<(), SyntheticError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SyntheticError::InvalidFloatParameter { parameter })
    }
}

fn into_vectors(dimension: usize, values: Vec<f32>) -> Result<DenseVectors, SyntheticError> {
    DenseVectors::new(dimension, values).map_err(|_| SyntheticError::ZeroDimensions)
}
