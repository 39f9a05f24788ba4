//! Weighted random walks with restart over a node's relationships.

use rand::{Rng, rngs::SmallRng};

use super::{KnnSampler, UniformSampler};
use crate::graph::GraphView;

/// Probability of jumping back to the start node before each step.
const RESTART_PROBABILITY: f64 = 0.15;
/// Walk length budget per requested candidate.
const STEPS_PER_CANDIDATE: usize = 16;

pub(crate) struct RandomWalkSampler<'g, G: ?Sized> {
    graph: &'g G,
}

impl<'g, G: GraphView + Sync + ?Sized> RandomWalkSampler<'g, G> {
    pub(crate) fn new(graph: &'g G) -> Self {
        Self { graph }
    }
}

impl<G: GraphView + Sync + ?Sized> KnnSampler for RandomWalkSampler<'_, G> {
    fn sample(&self, node: usize, count: usize, rng: &mut SmallRng, out: &mut Vec<usize>) {
        let node_count = self.graph.node_count();
        let wanted = count.min(node_count.saturating_sub(1));
        if wanted == 0 || self.graph.degree(node) == 0 {
            return;
        }
        let start = out.len();
        self.walk(node, wanted, rng, out);
        if out.len() - start < wanted {
            top_up(node, node_count, wanted, start, rng, out);
        }
    }
}

impl<G: GraphView + Sync + ?Sized> RandomWalkSampler<'_, G> {
    /// Appends distinct ids visited by restarting walks from `node`.
    fn walk(&self, node: usize, wanted: usize, rng: &mut SmallRng, out: &mut Vec<usize>) {
        let node_count = self.graph.node_count();
        let start = out.len();
        let mut relationships = Vec::new();
        let mut current = node;

        for _ in 0..wanted.saturating_mul(STEPS_PER_CANDIDATE) {
            if out.len() - start >= wanted {
                break;
            }
            if current != node && rng.gen_bool(RESTART_PROBABILITY) {
                current = node;
            }
            relationships.clear();
            self.graph
                .for_each_relationship(current, &mut |target, weight| {
                    relationships.push((target, weight));
                });
            let Some(next) = pick_weighted(&relationships, rng) else {
                current = node;
                continue;
            };
            if next != node && next < node_count && !out[start..].contains(&next) {
                out.push(next);
            }
            current = next;
        }
    }
}

/// Fills `out[start..]` up to `wanted` ids with uniform draws it does not hold.
///
/// `wanted` distinct draws overlap the walked ids at most once each, so the
/// remainder always covers the shortfall.
fn top_up(
    node: usize,
    node_count: usize,
    wanted: usize,
    start: usize,
    rng: &mut SmallRng,
    out: &mut Vec<usize>,
) {
    let mut drawn = Vec::with_capacity(wanted);
    UniformSampler::new(node_count).sample(node, wanted, rng, &mut drawn);
    for id in drawn {
        if out.len() - start >= wanted {
            break;
        }
        if !out[start..].contains(&id) {
            out.push(id);
        }
    }
}

/// Picks a target proportionally to weight; all-zero weights pick uniformly.
fn pick_weighted(relationships: &[(usize, f64)], rng: &mut SmallRng) -> Option<usize> {
    let last = relationships.last()?;
    let total: f64 = relationships.iter().map(|&(_, weight)| weight).sum();
    if total <= 0.0 {
        let index = rng.gen_range(0..relationships.len());
        return Some(relationships[index].0);
    }
    let mut remaining = rng.gen_range(0.0..total);
    for &(target, weight) in relationships {
        if remaining < weight {
            return Some(target);
        }
        remaining -= weight;
    }
    Some(last.0)
}
