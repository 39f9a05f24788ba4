//! KNN restricted to chosen source and target nodes.
//!
//! The search itself runs over every node, so nodes outside either filter
//! still act as stepping stones between neighbourhoods. A consumer hooked into
//! the engine keeps, per node, the best scored candidates that pass the target
//! filter; only nodes passing the source filter report them.

use std::sync::Mutex;

use tracing::{Span, field, info, instrument};

use super::{Knn, NOOP_PROGRESS};
use crate::{
    config::KnnConfig,
    error::{KnnError, Result},
    graph::GraphView,
    hooks::{NeighbourConsumer, ProgressTracker},
    neighbour_list::NeighbourList,
    result::KnnResult,
    similarity::{NeighbourFilter, SimilarityComputer},
    termination::TerminationFlag,
};

/// Selects nodes by id.
///
/// Closures `Fn(usize) -> bool` implement this trait.
pub trait NodeFilter: Sync {
    /// Returns whether `node` passes the filter.
    fn accepts(&self, node: usize) -> bool;
}

/// Accepts every node.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllNodes;

impl NodeFilter for AllNodes {
    fn accepts(&self, _node: usize) -> bool {
        true
    }
}

impl<F> NodeFilter for F
where
    F: Fn(usize) -> bool + Sync,
{
    fn accepts(&self, node: usize) -> bool {
        self(node)
    }
}

/// Approximate KNN whose results only list source nodes and only point at
/// target nodes.
///
/// # Examples
/// ```
/// use simgraph_core::{FilteredKnn, FnSimilarity, KnnConfigBuilder, KnnNeighbourFilter, NodesOnly};
///
/// let config = KnnConfigBuilder::new()
///     .with_top_k(2)
///     .with_sample_rate(1.0)
///     .with_random_seed(Some(5))
///     .build()?;
/// let knn = FilteredKnn::new(config, |node: usize| node < 2, |node: usize| node >= 4);
/// let similarity = FnSimilarity::new(|a: usize, b: usize| 1.0 / (1.0 + a.abs_diff(b) as f64));
/// let result = knn.compute(&NodesOnly(8), &similarity, &KnnNeighbourFilter)?;
///
/// assert!(result.neighbours_of(5).is_empty());
/// assert!(result.neighbours_of(0).iter().all(|n| n.id() >= 4));
/// # Ok::<(), simgraph_core::KnnError>(())
/// ```
pub struct FilteredKnn<'h, SF, TF> {
    config: KnnConfig,
    source_filter: SF,
    target_filter: TF,
    progress: &'h dyn ProgressTracker,
    termination: TerminationFlag,
}

impl<SF: NodeFilter, TF: NodeFilter> FilteredKnn<'static, SF, TF> {
    /// Creates a filtered engine with no-op progress and a fresh termination
    /// flag.
    #[must_use]
    pub fn new(config: KnnConfig, source_filter: SF, target_filter: TF) -> Self {
        Self {
            config,
            source_filter,
            target_filter,
            progress: &NOOP_PROGRESS,
            termination: TerminationFlag::new(),
        }
    }
}

impl<'h, SF: NodeFilter, TF: NodeFilter> FilteredKnn<'h, SF, TF> {
    /// Reports phase progress to `progress`.
    #[must_use]
    pub fn with_progress<'a>(self, progress: &'a dyn ProgressTracker) -> FilteredKnn<'a, SF, TF>
    where
        'h: 'a,
    {
        FilteredKnn {
            config: self.config,
            source_filter: self.source_filter,
            target_filter: self.target_filter,
            progress,
            termination: self.termination,
        }
    }

    /// Observes `flag` for cooperative cancellation.
    #[must_use]
    pub fn with_termination_flag(mut self, flag: TerminationFlag) -> Self {
        self.termination = flag;
        self
    }

    /// Returns the validated configuration.
    #[must_use]
    #[rustfmt::skip]
    pub fn config(&self) -> &KnnConfig { &self.config }

    /// Returns a handle that cancels runs of this engine.
    #[must_use]
    #[rustfmt::skip]
    pub fn termination_flag(&self) -> &TerminationFlag { &self.termination }

    /// Runs the search and returns, for every source node, its best targets.
    ///
    /// Nodes failing the source filter have no neighbours in the result. Run
    /// metadata is that of the underlying search. A positive similarity
    /// cutoff applies to the filtered lists as well.
    ///
    /// # Errors
    /// Fails exactly when [`Knn::compute`] fails, plus
    /// [`KnnError::LockPoisoned`] if a filtered list was poisoned.
    #[instrument(
        name = "knn.filtered",
        err,
        skip(self, graph, similarity, filter),
        fields(
            node_count = graph.node_count(),
            source_nodes = field::Empty,
            relationships = field::Empty,
        ),
    )]
    pub fn compute<G, S, F>(&self, graph: &G, similarity: &S, filter: &F) -> Result<KnnResult>
    where
        G: GraphView + Sync + ?Sized,
        S: SimilarityComputer + ?Sized,
        F: NeighbourFilter + ?Sized,
    {
        let node_count = graph.node_count();
        let capacity = self.config.top_k().get().min(node_count.saturating_sub(1));
        let targets = TargetFilteringConsumer::new(node_count, capacity, &self.target_filter);
        let result = Knn::new(self.config.clone())
            .with_progress(self.progress)
            .with_termination_flag(self.termination.clone())
            .with_neighbour_consumer(&targets)
            .compute(graph, similarity, filter)?;

        let cutoff = self.config.similarity_cutoff();
        let mut source_nodes = 0_usize;
        let neighbours = targets
            .into_lists()?
            .into_iter()
            .enumerate()
            .map(|(node, list)| {
                if !self.source_filter.accepts(node) {
                    return Vec::new();
                }
                source_nodes += 1;
                list.iter()
                    .filter(|neighbour| cutoff <= 0.0 || neighbour.similarity() >= cutoff)
                    .collect()
            })
            .collect();
        let result = result.with_neighbours(neighbours);

        let span = Span::current();
        span.record("source_nodes", source_nodes);
        span.record("relationships", result.size());
        info!(
            source_nodes,
            relationships = result.size(),
            "filtered knn computation finished"
        );
        Ok(result)
    }
}

/// Keeps the best target-passing candidates scored for each node.
struct TargetFilteringConsumer<'f, TF: ?Sized> {
    lists: Vec<Mutex<NeighbourList>>,
    target_filter: &'f TF,
}

impl<'f, TF: NodeFilter + ?Sized> TargetFilteringConsumer<'f, TF> {
    fn new(node_count: usize, capacity: usize, target_filter: &'f TF) -> Self {
        Self {
            lists: (0..node_count)
                .map(|node| Mutex::new(NeighbourList::new(node, capacity)))
                .collect(),
            target_filter,
        }
    }

    fn into_lists(self) -> Result<Vec<NeighbourList>> {
        self.lists
            .into_iter()
            .map(|list| {
                list.into_inner().map_err(|_| KnnError::LockPoisoned {
                    resource: "target neighbour list",
                })
            })
            .collect()
    }
}

impl<TF: NodeFilter + ?Sized> NeighbourConsumer for TargetFilteringConsumer<'_, TF> {
    fn offer(&self, _node: usize, _neighbours: &[usize]) {}

    fn consider(&self, node: usize, candidate: usize, similarity: f64) {
        if !self.target_filter.accepts(candidate) {
            return;
        }
        // A poisoned slot is reported by `into_lists`.
        if let Some(Ok(mut list)) = self.lists.get(node).map(Mutex::lock) {
            list.add_keeping_ties(candidate, similarity);
        }
    }
}
