//! Initial population of neighbour lists from a sampler.

use super::{PHASE_INIT, RunContext};
use crate::{
    error::Result,
    graph::GraphView,
    rng::StreamSeed,
    sampler::{KnnSampler, Sampler},
    similarity::{NeighbourFilter, SimilarityComputer},
};

/// Fills every list with sampled candidates and returns the pairs evaluated.
///
/// Each task only writes the lists of its own partition.
pub(super) fn initialize<G, S, F>(
    ctx: &RunContext<'_, S, F>,
    sampler: &Sampler<'_, G>,
    bounded_k: usize,
    stream: StreamSeed,
) -> Result<u64>
where
    G: GraphView + Sync + ?Sized,
    S: SimilarityComputer + ?Sized,
    F: NeighbourFilter + ?Sized,
{
    ctx.progress
        .begin_subtask(PHASE_INIT, ctx.lists.len() as u64);
    let counts = ctx.run_partitions(|partition| {
        let mut candidates = Vec::with_capacity(bounded_k);
        let mut admitted = Vec::with_capacity(bounded_k);
        let mut pairs_considered = 0_u64;
        for node in partition.nodes() {
            ctx.checkpoint(partition, node, PHASE_INIT)?;
            let mut rng = stream.rng_for_node(node);
            candidates.clear();
            sampler.sample(node, bounded_k, &mut rng, &mut candidates);
            for &candidate in &candidates {
                if ctx.filter.exclude_node_pair(node, candidate) {
                    continue;
                }
                let similarity = ctx.similarity.compute(node, candidate)?;
                pairs_considered += 1;
                ctx.consumer.consider(node, candidate, similarity);
                ctx.lock(node)?
                    .add(candidate, similarity, &mut rng, ctx.perturbation_rate);
            }
            admitted.clear();
            admitted.extend(ctx.lock(node)?.ids());
            ctx.consumer.offer(node, &admitted);
        }
        ctx.progress.log_progress(partition.node_count() as u64);
        Ok(pairs_considered)
    })?;
    ctx.progress.end_subtask(PHASE_INIT);
    Ok(counts.into_iter().sum())
}
