//! Initial neighbour samplers.

mod random_walk;
mod uniform;

use rand::rngs::SmallRng;

pub(crate) use random_walk::RandomWalkSampler;
pub(crate) use uniform::UniformSampler;

use crate::graph::GraphView;

/// Strategy used to seed each node's neighbour list before refinement.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SamplerKind {
    /// Distinct ids drawn uniformly from all other nodes.
    #[default]
    Uniform,
    /// Ids visited by weighted random walks over the node's relationships.
    RandomWalk,
}

impl SamplerKind {
    /// Returns the stable lowercase name used in logs and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::RandomWalk => "random-walk",
        }
    }
}

impl std::fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces candidate neighbour ids for one node.
pub(crate) trait KnnSampler: Sync {
    /// Appends up to `count` distinct ids other than `node` to `out`.
    fn sample(&self, node: usize, count: usize, rng: &mut SmallRng, out: &mut Vec<usize>);
}

/// Sampler selected by [`SamplerKind`], borrowing the graph it walks.
pub(crate) enum Sampler<'g, G: ?Sized> {
    Uniform(UniformSampler),
    RandomWalk(RandomWalkSampler<'g, G>),
}

impl<'g, G: GraphView + Sync + ?Sized> Sampler<'g, G> {
    pub(crate) fn new(kind: SamplerKind, graph: &'g G) -> Self {
        match kind {
            SamplerKind::Uniform => Self::Uniform(UniformSampler::new(graph.node_count())),
            SamplerKind::RandomWalk => Self::RandomWalk(RandomWalkSampler::new(graph)),
        }
    }
}

impl<G: GraphView + Sync + ?Sized> KnnSampler for Sampler<'_, G> {
    fn sample(&self, node: usize, count: usize, rng: &mut SmallRng, out: &mut Vec<usize>) {
        match self {
            Self::Uniform(sampler) => sampler.sample(node, count, rng, out),
            Self::RandomWalk(sampler) => sampler.sample(node, count, rng, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(SamplerKind::Uniform, "uniform")]
    #[case(SamplerKind::RandomWalk, "random-walk")]
    fn sampler_names_are_stable(#[case] kind: SamplerKind, #[case] expected: &str) {
        assert_eq!(kind.as_str(), expected);
        assert_eq!(kind.to_string(), expected);
    }
}
