//! Local joins: introducing a node's neighbours to one another.

use rand::{Rng, rngs::SmallRng};

use super::{PHASE_JOIN, RunContext};
use crate::{
    error::Result,
    partition::Partition,
    rng::StreamSeed,
    similarity::{NeighbourFilter, SimilarityComputer},
};

/// Read-only candidate maps for one join phase.
pub(super) struct JoinInput<'a> {
    pub(super) old: &'a [Vec<usize>],
    pub(super) new: &'a [Vec<usize>],
    pub(super) reverse_old: &'a [Vec<usize>],
    pub(super) reverse_new: &'a [Vec<usize>],
    pub(super) sampled_k: usize,
    pub(super) random_joins: usize,
}

/// Counters reduced across join tasks.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct JoinOutcome {
    /// Accepted list insertions, excluding random joins.
    pub(crate) updates: u64,
    /// Similarity evaluations, including random joins.
    pub(crate) pairs_considered: u64,
}

impl JoinOutcome {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            updates: self.updates + other.updates,
            pairs_considered: self.pairs_considered + other.pairs_considered,
        }
    }
}

/// Joins every node of one partition.
pub(super) struct JoinTask<'t, 'r, S: ?Sized, F: ?Sized> {
    ctx: &'t RunContext<'r, S, F>,
    input: &'t JoinInput<'t>,
    symmetric: bool,
    node_count: usize,
    pairs_considered: u64,
}

impl<'t, 'r, S, F> JoinTask<'t, 'r, S, F>
where
    S: SimilarityComputer + ?Sized,
    F: NeighbourFilter + ?Sized,
{
    pub(super) fn new(ctx: &'t RunContext<'r, S, F>, input: &'t JoinInput<'t>) -> Self {
        Self {
            ctx,
            input,
            symmetric: ctx.similarity.is_symmetric(),
            node_count: ctx.lists.len(),
            pairs_considered: 0,
        }
    }

    pub(super) fn run(mut self, partition: Partition, stream: StreamSeed) -> Result<JoinOutcome> {
        let mut old = Vec::new();
        let mut new = Vec::new();
        let mut updates = 0;
        for node in partition.nodes() {
            self.ctx.checkpoint(partition, node, PHASE_JOIN)?;
            let mut rng = stream.rng_for_node(node);
            let sampled_k = self.input.sampled_k;
            working_set(
                &self.input.old[node],
                &self.input.reverse_old[node],
                sampled_k,
                &mut rng,
                &mut old,
            );
            working_set(
                &self.input.new[node],
                &self.input.reverse_new[node],
                sampled_k,
                &mut rng,
                &mut new,
            );
            updates += self.join_new_neighbours(node, &old, &new, &mut rng)?;
            self.random_joins(node, &mut rng)?;
        }
        self.ctx
            .progress
            .log_progress(partition.node_count() as u64);
        Ok(JoinOutcome {
            updates,
            pairs_considered: self.pairs_considered,
        })
    }

    fn join_new_neighbours(
        &mut self,
        node: usize,
        old: &[usize],
        new: &[usize],
        rng: &mut SmallRng,
    ) -> Result<u64> {
        let mut updates = 0;
        for (index, &first) in new.iter().enumerate() {
            updates += self.join(first, node, rng)?;
            for &second in &new[index + 1..] {
                updates += self.join_pair(first, second, rng)?;
            }
            for &second in old {
                updates += self.join_pair(first, second, rng)?;
            }
        }
        Ok(updates)
    }

    /// Random joins mutate lists but never count as updates.
    fn random_joins(&mut self, node: usize, rng: &mut SmallRng) -> Result<()> {
        for _ in 0..self.input.random_joins {
            let mut other = rng.gen_range(0..self.node_count - 1);
            if other >= node {
                other += 1;
            }
            self.join(node, other, rng)?;
        }
        Ok(())
    }

    fn join_pair(&mut self, first: usize, second: usize, rng: &mut SmallRng) -> Result<u64> {
        if first == second {
            return Ok(0);
        }
        if self.symmetric {
            self.join_symmetric(first, second, rng)
        } else {
            Ok(self.join(first, second, rng)? + self.join(second, first, rng)?)
        }
    }

    /// Evaluates once and offers each node to the other's list.
    fn join_symmetric(&mut self, first: usize, second: usize, rng: &mut SmallRng) -> Result<u64> {
        if self.ctx.filter.exclude_node_pair(first, second) {
            return Ok(0);
        }
        let similarity = self.ctx.similarity.compute(first, second)?;
        self.pairs_considered += 1;
        self.ctx.consumer.consider(first, second, similarity);
        self.ctx.consumer.consider(second, first, similarity);
        let rate = self.ctx.perturbation_rate;
        let mut updates = self.ctx.lock(first)?.add(second, similarity, rng, rate);
        updates += self.ctx.lock(second)?.add(first, similarity, rng, rate);
        Ok(updates)
    }

    /// Offers `candidate` to `base`'s list.
    fn join(&mut self, base: usize, candidate: usize, rng: &mut SmallRng) -> Result<u64> {
        if base == candidate || self.ctx.filter.exclude_node_pair(base, candidate) {
            return Ok(0);
        }
        let similarity = self.ctx.similarity.compute(base, candidate)?;
        self.pairs_considered += 1;
        self.ctx.consumer.consider(base, candidate, similarity);
        Ok(self
            .ctx
            .lock(base)?
            .add(candidate, similarity, rng, self.ctx.perturbation_rate))
    }
}

/// Fills `out` with `base` plus a sample of `reverse`, without repeats.
///
/// Each reverse id is kept with probability `sampled_k / reverse.len()`.
fn working_set(
    base: &[usize],
    reverse: &[usize],
    sampled_k: usize,
    rng: &mut SmallRng,
    out: &mut Vec<usize>,
) {
    out.clear();
    out.extend_from_slice(base);
    let len = reverse.len();
    for &id in reverse {
        if rng.gen_range(0..len) < sampled_k && !out.contains(&id) {
            out.push(id);
        }
    }
}
