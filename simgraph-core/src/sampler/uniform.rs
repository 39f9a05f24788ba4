//! Uniform sampling of distinct non-self node ids.

use rand::{rngs::SmallRng, seq::index};

use super::KnnSampler;

pub(crate) struct UniformSampler {
    node_count: usize,
}

impl UniformSampler {
    pub(crate) fn new(node_count: usize) -> Self {
        Self { node_count }
    }
}

impl KnnSampler for UniformSampler {
    fn sample(&self, node: usize, count: usize, rng: &mut SmallRng, out: &mut Vec<usize>) {
        let others = self.node_count.saturating_sub(1);
        let amount = count.min(others);
        if amount == 0 {
            return;
        }
        // Draw from `0..others` and shift ids at or above `node` past it.
        out.extend(
            index::sample(rng, others, amount)
                .into_iter()
                .map(|candidate| if candidate >= node { candidate + 1 } else { candidate }),
        );
    }
}
