//! Output of a KNN run and derived statistics.
//!
//! A [`KnnResult`] owns each node's final neighbours (most similar first)
//! alongside the run metadata needed to judge convergence and cost.

use crate::neighbour_list::Neighbour;

/// One directed `source -> target` similarity relationship.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SimilarityResult {
    /// Node owning the neighbour list.
    pub source: usize,
    /// Neighbour found for `source`.
    pub target: usize,
    /// Similarity of `target` to `source`.
    pub similarity: f64,
}

/// Represents the output of a [`crate::Knn::compute`] invocation.
///
/// # Examples
/// ```
/// use simgraph_core::{FnSimilarity, Knn, KnnConfigBuilder, KnnNeighbourFilter, NodesOnly};
///
/// let config = KnnConfigBuilder::new()
///     .with_top_k(2)
///     .with_sample_rate(1.0)
///     .with_max_iterations(1)
///     .with_random_seed(Some(1))
///     .build()?;
/// let result = Knn::new(config).compute(
///     &NodesOnly(3),
///     &FnSimilarity::new(|_, _| 1.0),
///     &KnnNeighbourFilter,
/// )?;
/// assert_eq!(result.size(), 6);
/// assert_eq!(result.nodes_compared(), 3);
/// # Ok::<(), simgraph_core::KnnError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct KnnResult {
    neighbours: Vec<Vec<Neighbour>>,
    ran_iterations: usize,
    did_converge: bool,
    node_pairs_considered: u64,
    nodes_compared: usize,
}

impl KnnResult {
    pub(crate) fn new(
        neighbours: Vec<Vec<Neighbour>>,
        ran_iterations: usize,
        did_converge: bool,
        node_pairs_considered: u64,
    ) -> Self {
        let nodes_compared = neighbours.len();
        Self {
            neighbours,
            ran_iterations,
            did_converge,
            node_pairs_considered,
            nodes_compared,
        }
    }

    /// Result for inputs too small to compare: no edges, no iterations and
    /// no nodes compared.
    pub(crate) fn empty(node_count: usize) -> Self {
        Self {
            neighbours: vec![Vec::new(); node_count],
            ran_iterations: 0,
            did_converge: false,
            node_pairs_considered: 0,
            nodes_compared: 0,
        }
    }

    /// Swaps in `neighbours`, keeping the run metadata.
    pub(crate) fn with_neighbours(self, neighbours: Vec<Vec<Neighbour>>) -> Self {
        Self { neighbours, ..self }
    }

    /// Returns the neighbours of `node`, most similar first.
    ///
    /// Unknown nodes have no neighbours.
    #[must_use]
    pub fn neighbours_of(&self, node: usize) -> &[Neighbour] {
        self.neighbours.get(node).map_or(&[], Vec::as_slice)
    }

    /// Returns the similarity `source` recorded for `target`, if `target` is
    /// among its final neighbours.
    #[must_use]
    pub fn similarity_of(&self, source: usize, target: usize) -> Option<f64> {
        self.neighbours_of(source)
            .iter()
            .find(|neighbour| neighbour.id() == target)
            .map(Neighbour::similarity)
    }

    /// Returns every node's neighbours indexed by node id.
    #[must_use]
    #[rustfmt::skip]
    pub fn neighbours(&self) -> &[Vec<Neighbour>] { &self.neighbours }

    /// Iterates all relationships grouped by source node.
    pub fn similarity_results(&self) -> impl Iterator<Item = SimilarityResult> + '_ {
        self.neighbours
            .iter()
            .enumerate()
            .flat_map(|(source, neighbours)| {
                neighbours.iter().map(move |neighbour| SimilarityResult {
                    source,
                    target: neighbour.id(),
                    similarity: neighbour.similarity(),
                })
            })
    }

    /// Returns the total number of relationships across all nodes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.neighbours.iter().map(Vec::len).sum()
    }

    /// Returns how many refinement iterations ran.
    #[must_use]
    #[rustfmt::skip]
    pub fn ran_iterations(&self) -> usize { self.ran_iterations }

    /// Returns whether the run stopped because updates fell below the threshold.
    #[must_use]
    #[rustfmt::skip]
    pub fn did_converge(&self) -> bool { self.did_converge }

    /// Returns the cumulative number of similarity evaluations.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_pairs_considered(&self) -> u64 { self.node_pairs_considered }

    /// Returns the number of nodes the run covered; `0` when the input was too
    /// small to compare.
    #[must_use]
    #[rustfmt::skip]
    pub fn nodes_compared(&self) -> usize { self.nodes_compared }

    /// Summarises the similarity distribution, or `None` without relationships.
    #[must_use]
    pub fn similarity_summary(&self) -> Option<SimilaritySummary> {
        SimilaritySummary::from_values(self.similarity_results().map(|r| r.similarity).collect())
    }
}

/// Distribution statistics over all result similarities.
///
/// Percentiles use the nearest-rank method.
///
/// # Examples
/// ```
/// use simgraph_core::SimilaritySummary;
///
/// let summary = SimilaritySummary::from_values(vec![0.4, 0.1, 0.3, 0.2]).expect("non-empty");
/// assert_eq!(summary.min, 0.1);
/// assert_eq!(summary.p50, 0.2);
/// assert_eq!(summary.p100, 0.4);
/// assert!((summary.mean - 0.25).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SimilaritySummary {
    /// Smallest similarity.
    pub min: f64,
    /// Largest similarity.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub stdev: f64,
    /// 50th percentile.
    pub p50: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 99th percentile.
    pub p99: f64,
    /// 100th percentile.
    pub p100: f64,
}

impl SimilaritySummary {
    /// Computes the summary of `values`; `None` when empty.
    #[must_use]
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / count;
        let percentile = |p: f64| {
            let rank = (p * count / 100.0).ceil() as usize;
            values[rank.clamp(1, values.len()) - 1]
        };
        Some(Self {
            min: values[0],
            max: values[values.len() - 1],
            mean,
            stdev: variance.sqrt(),
            p50: percentile(50.0),
            p75: percentile(75.0),
            p90: percentile(90.0),
            p95: percentile(95.0),
            p99: percentile(99.0),
            p100: percentile(100.0),
        })
    }
}
