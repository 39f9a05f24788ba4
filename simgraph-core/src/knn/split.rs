//! Old/new candidate split and reverse-neighbour construction.

use super::{PHASE_SPLIT, RunContext};
use crate::{
    error::Result,
    rng::StreamSeed,
    similarity::{NeighbourFilter, SimilarityComputer},
};

/// Per-node old and new neighbour ids for one iteration.
pub(super) struct Candidates {
    pub(super) old: Vec<Vec<usize>>,
    pub(super) new: Vec<Vec<usize>>,
}

/// Splits every list into explored (`old`) and freshly sampled (`new`) ids.
pub(super) fn split<S, F>(
    ctx: &RunContext<'_, S, F>,
    sampled_k: usize,
    stream: StreamSeed,
) -> Result<Candidates>
where
    S: SimilarityComputer + ?Sized,
    F: NeighbourFilter + ?Sized,
{
    let chunks = ctx.run_partitions(|partition| {
        let mut old_chunk = Vec::with_capacity(partition.node_count());
        let mut new_chunk = Vec::with_capacity(partition.node_count());
        for node in partition.nodes() {
            ctx.checkpoint(partition, node, PHASE_SPLIT)?;
            let mut rng = stream.rng_for_node(node);
            let (mut old, mut new) = (Vec::new(), Vec::new());
            ctx.lock(node)?
                .split_old_new(&mut rng, sampled_k, &mut old, &mut new);
            old_chunk.push(old);
            new_chunk.push(new);
        }
        ctx.progress.log_progress(partition.node_count() as u64);
        Ok((old_chunk, new_chunk))
    })?;

    let node_count = ctx.lists.len();
    let mut candidates = Candidates {
        old: Vec::with_capacity(node_count),
        new: Vec::with_capacity(node_count),
    };
    for (old, new) in chunks {
        candidates.old.extend(old);
        candidates.new.extend(new);
    }
    Ok(candidates)
}

/// Inverts `neighbours`: `reverse[u]` lists every node whose entry holds `u`.
///
/// Sources are visited in id order, so each reverse list is sorted.
pub(super) fn reverse(neighbours: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut reverse = vec![Vec::new(); neighbours.len()];
    for (node, ids) in neighbours.iter().enumerate() {
        for &id in ids {
            if let Some(entry) = reverse.get_mut(id) {
                entry.push(node);
            }
        }
    }
    reverse
}
