//! NN-Descent orchestration.
//!
//! A run seeds every node's list with a sampler, then repeats
//! split, reverse and join phases until the number of accepted updates falls
//! to the convergence threshold or the iteration cap is reached. Phases run on
//! a dedicated worker pool and act as barriers: each one completes for every
//! partition before the next starts.

mod filtered;
mod init;
mod join;
mod split;

use std::sync::{Mutex, MutexGuard};

use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use tracing::{Span, debug, field, info, instrument};

use crate::{
    bounded_k::BoundedK,
    config::KnnConfig,
    error::{KnnError, Result},
    graph::GraphView,
    hooks::{NeighbourConsumer, NoopConsumer, NoopProgress, ProgressTracker},
    neighbour_list::NeighbourList,
    partition::{Partition, range_partition},
    result::KnnResult,
    rng::SeedSplitter,
    sampler::Sampler,
    similarity::{NeighbourFilter, SimilarityComputer, SimilarityFunction},
    termination::TerminationFlag,
};

pub use self::filtered::{AllNodes, FilteredKnn, NodeFilter};

use self::join::{JoinInput, JoinTask};

/// Nodes processed by a task between termination checks.
const TERMINATION_CHECK_INTERVAL: usize = 256;

const PHASE_INIT: &str = "initialization";
const PHASE_SPLIT: &str = "split";
const PHASE_REVERSE: &str = "reverse";
const PHASE_JOIN: &str = "join";
const PHASE_CUTOFF: &str = "cutoff";

static NOOP_PROGRESS: NoopProgress = NoopProgress;
static NOOP_CONSUMER: NoopConsumer = NoopConsumer;

/// Approximate k-nearest-neighbour graph builder.
///
/// # Examples
/// ```
/// use simgraph_core::{
///     DenseVectors, Knn, KnnConfigBuilder, KnnNeighbourFilter, NodesOnly, VectorMetric,
///     VectorSimilarity,
/// };
///
/// let vectors = DenseVectors::from_rows(vec![
///     vec![1.0, 0.0],
///     vec![0.9, 0.1],
///     vec![0.0, 1.0],
///     vec![0.1, 0.9],
/// ])?;
/// let similarity = VectorSimilarity::new(vectors, VectorMetric::Cosine);
/// let config = KnnConfigBuilder::new()
///     .with_top_k(3)
///     .with_sample_rate(1.0)
///     .with_random_seed(Some(3))
///     .build()?;
///
/// let result = Knn::new(config).compute(&NodesOnly(4), &similarity, &KnnNeighbourFilter)?;
/// assert_eq!(result.neighbours_of(0)[0].id(), 1);
/// assert_eq!(result.neighbours_of(3)[0].id(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Knn<'h> {
    config: KnnConfig,
    progress: &'h dyn ProgressTracker,
    consumer: &'h dyn NeighbourConsumer,
    termination: TerminationFlag,
}

impl Knn<'static> {
    /// Creates an engine with no-op hooks and a fresh termination flag.
    #[must_use]
    pub fn new(config: KnnConfig) -> Self {
        Self {
            config,
            progress: &NOOP_PROGRESS,
            consumer: &NOOP_CONSUMER,
            termination: TerminationFlag::new(),
        }
    }
}

impl<'h> Knn<'h> {
    /// Reports phase progress to `progress`.
    #[must_use]
    pub fn with_progress<'a>(self, progress: &'a dyn ProgressTracker) -> Knn<'a>
    where
        'h: 'a,
    {
        Knn {
            config: self.config,
            progress,
            consumer: self.consumer,
            termination: self.termination,
        }
    }

    /// Reports initial samples and every scored candidate to `consumer`.
    #[must_use]
    pub fn with_neighbour_consumer<'a>(self, consumer: &'a dyn NeighbourConsumer) -> Knn<'a>
    where
        'h: 'a,
    {
        Knn {
            config: self.config,
            progress: self.progress,
            consumer,
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

    /// Computes the approximate top-k similarity graph over `graph`'s nodes.
    ///
    /// Fewer than two nodes yield an empty result without touching the metric.
    ///
    /// # Errors
    /// - [`KnnError::NodeCountMismatch`] when `similarity` reports a node count
    ///   different from `graph`.
    /// - [`KnnError::Cancelled`] when the termination flag is raised.
    /// - [`KnnError::Similarity`] or [`KnnError::NonFiniteSimilarity`] when the
    ///   metric fails for any evaluated pair.
    /// - [`KnnError::ThreadPool`] or [`KnnError::LockPoisoned`] on worker
    ///   infrastructure failures.
    #[instrument(
        name = "knn.compute",
        err,
        skip(self, graph, similarity, filter),
        fields(
            node_count = graph.node_count(),
            top_k = self.config.top_k().get(),
            sampler = %self.config.sampler(),
            concurrency = self.config.concurrency().get(),
            ran_iterations = field::Empty,
            did_converge = field::Empty,
        ),
    )]
    pub fn compute<G, S, F>(&self, graph: &G, similarity: &S, filter: &F) -> Result<KnnResult>
    where
        G: GraphView + Sync + ?Sized,
        S: SimilarityComputer + ?Sized,
        F: NeighbourFilter + ?Sized,
    {
        let node_count = graph.node_count();
        if let Some(covered) = similarity.node_count()
            && covered != node_count
        {
            return Err(KnnError::NodeCountMismatch {
                graph: node_count,
                similarity: covered,
            });
        }
        if node_count < 2 {
            info!(node_count, "fewer than two nodes, returning empty result");
            return Ok(KnnResult::empty(node_count));
        }
        self.termination.assert_running(PHASE_INIT)?;

        let config = &self.config;
        let k = BoundedK::new(config.top_k().get(), config.sample_rate(), node_count)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.concurrency().get())
            .build()
            .map_err(|error| KnnError::ThreadPool {
                message: error.to_string(),
            })?;
        let partitions = range_partition(
            config.concurrency().get(),
            node_count,
            config.min_batch_size().get(),
        );
        let mut seeds = SeedSplitter::new(config.random_seed());
        debug!(
            seed = seeds.base_seed(),
            bounded_k = k.bounded(),
            sampled_k = k.sampled(),
            partitions = partitions.len(),
            "knn run configured"
        );

        let lists: Vec<Mutex<NeighbourList>> = (0..node_count)
            .map(|node| Mutex::new(NeighbourList::new(node, k.bounded())))
            .collect();
        let ctx = RunContext {
            pool: &pool,
            partitions: &partitions,
            lists: &lists,
            similarity: SimilarityFunction::new(similarity),
            filter,
            termination: &self.termination,
            progress: self.progress,
            consumer: self.consumer,
            perturbation_rate: config.perturbation_rate(),
        };

        let sampler = Sampler::new(config.sampler(), graph);
        let mut node_pairs_considered =
            init::initialize(&ctx, &sampler, k.bounded(), seeds.split())?;
        record_initialization(node_pairs_considered);

        let update_threshold = config.update_threshold(node_count);
        let mut ran_iterations = 0;
        let mut did_converge = false;
        while ran_iterations < config.max_iterations() {
            let outcome = self.iterate(&ctx, k, &mut seeds, ran_iterations)?;
            node_pairs_considered += outcome.pairs_considered;
            ran_iterations += 1;
            record_iteration(outcome.updates, outcome.pairs_considered);
            if outcome.updates <= update_threshold {
                did_converge = true;
                break;
            }
        }

        if config.similarity_cutoff() > 0.0 {
            self.termination.assert_running(PHASE_CUTOFF)?;
            filter_below_cutoff(&ctx, config.similarity_cutoff())?;
        }

        let neighbours = lists
            .into_iter()
            .map(|list| {
                list.into_inner()
                    .map(|list| list.iter().collect::<Vec<_>>())
                    .map_err(|_| KnnError::LockPoisoned {
                        resource: "neighbour list",
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let span = Span::current();
        span.record("ran_iterations", ran_iterations);
        span.record("did_converge", did_converge);
        info!(
            ran_iterations,
            did_converge, node_pairs_considered, update_threshold, "knn computation finished"
        );
        Ok(KnnResult::new(
            neighbours,
            ran_iterations,
            did_converge,
            node_pairs_considered,
        ))
    }

    #[instrument(
        name = "knn.iteration",
        err,
        skip(self, ctx, k, seeds),
        fields(updates = field::Empty, pairs_considered = field::Empty),
    )]
    fn iterate<S, F>(
        &self,
        ctx: &RunContext<'_, S, F>,
        k: BoundedK,
        seeds: &mut SeedSplitter,
        iteration: usize,
    ) -> Result<join::JoinOutcome>
    where
        S: SimilarityComputer + ?Sized,
        F: NeighbourFilter + ?Sized,
    {
        let node_count = ctx.lists.len();

        self.termination.assert_running(PHASE_SPLIT)?;
        ctx.progress.begin_subtask(PHASE_SPLIT, node_count as u64);
        let candidates = split::split(ctx, k.sampled(), seeds.split())?;
        ctx.progress.end_subtask(PHASE_SPLIT);

        self.termination.assert_running(PHASE_REVERSE)?;
        ctx.progress.begin_subtask(PHASE_REVERSE, node_count as u64);
        let reverse_old = split::reverse(&candidates.old);
        let reverse_new = split::reverse(&candidates.new);
        ctx.progress.log_progress(node_count as u64);
        ctx.progress.end_subtask(PHASE_REVERSE);

        self.termination.assert_running(PHASE_JOIN)?;
        ctx.progress.begin_subtask(PHASE_JOIN, node_count as u64);
        let input = JoinInput {
            old: &candidates.old,
            new: &candidates.new,
            reverse_old: &reverse_old,
            reverse_new: &reverse_new,
            sampled_k: k.sampled(),
            random_joins: self.config.random_joins(),
        };
        let stream = seeds.split();
        let outcomes = ctx.run_partitions(|partition| JoinTask::new(ctx, &input).run(partition, stream))?;
        ctx.progress.end_subtask(PHASE_JOIN);

        let outcome = outcomes
            .into_iter()
            .fold(join::JoinOutcome::default(), join::JoinOutcome::merge);
        let span = Span::current();
        span.record("updates", outcome.updates);
        span.record("pairs_considered", outcome.pairs_considered);
        Ok(outcome)
    }
}

/// Shared, read-only state handed to every phase task.
pub(crate) struct RunContext<'r, S: ?Sized, F: ?Sized> {
    pool: &'r ThreadPool,
    partitions: &'r [Partition],
    lists: &'r [Mutex<NeighbourList>],
    similarity: SimilarityFunction<'r, S>,
    filter: &'r F,
    termination: &'r TerminationFlag,
    progress: &'r dyn ProgressTracker,
    consumer: &'r dyn NeighbourConsumer,
    perturbation_rate: f64,
}

impl<S, F> RunContext<'_, S, F>
where
    S: SimilarityComputer + ?Sized,
    F: NeighbourFilter + ?Sized,
{
    /// Runs `task` once per partition on the pool, keeping partition order.
    fn run_partitions<T, Task>(&self, task: Task) -> Result<Vec<T>>
    where
        T: Send,
        Task: Fn(Partition) -> Result<T> + Sync,
    {
        self.pool
            .install(|| self.partitions.par_iter().map(|&p| task(p)).collect())
    }

    /// Polls the termination flag every few nodes of a partition.
    fn checkpoint(&self, partition: Partition, node: usize, phase: &'static str) -> Result<()> {
        if (node - partition.start_node()) % TERMINATION_CHECK_INTERVAL == 0 {
            self.termination.assert_running(phase)?;
        }
        Ok(())
    }

    fn lock(&self, node: usize) -> Result<MutexGuard<'_, NeighbourList>> {
        self.lists[node]
            .lock()
            .map_err(|_| KnnError::LockPoisoned {
                resource: "neighbour list",
            })
    }
}

fn filter_below_cutoff<S, F>(ctx: &RunContext<'_, S, F>, cutoff: f64) -> Result<()>
where
    S: SimilarityComputer + ?Sized,
    F: NeighbourFilter + ?Sized,
{
    ctx.progress
        .begin_subtask(PHASE_CUTOFF, ctx.lists.len() as u64);
    ctx.run_partitions(|partition| {
        for node in partition.nodes() {
            ctx.checkpoint(partition, node, PHASE_CUTOFF)?;
            ctx.lock(node)?.filter_high_similarity_results(cutoff);
        }
        ctx.progress.log_progress(partition.node_count() as u64);
        Ok(())
    })?;
    ctx.progress.end_subtask(PHASE_CUTOFF);
    Ok(())
}

#[cfg(feature = "metrics")]
fn record_initialization(pairs_considered: u64) {
    metrics::counter!("knn_node_pairs_considered").increment(pairs_considered);
}

#[cfg(not(feature = "metrics"))]
fn record_initialization(_pairs_considered: u64) {}

#[cfg(feature = "metrics")]
fn record_iteration(updates: u64, pairs_considered: u64) {
    metrics::counter!("knn_iterations").increment(1);
    metrics::counter!("knn_updates").increment(updates);
    metrics::counter!("knn_node_pairs_considered").increment(pairs_considered);
}

#[cfg(not(feature = "metrics"))]
fn record_iteration(_updates: u64, _pairs_considered: u64) {}
