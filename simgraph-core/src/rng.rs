//! Seed derivation for reproducible, independent random streams.
//!
//! A run owns one [`SeedSplitter`]. Every parallel phase asks it for a fresh
//! [`StreamSeed`], and each task derives a per-node generator from that seed.
//! Keying generators on the node id keeps draws independent of how the node
//! range was partitioned, so the worker count never changes the outcome.

use rand::{SeedableRng, rngs::SmallRng};

/// SplitMix64 increment (the 64-bit golden ratio) used for stream derivation.
const STREAM_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

#[inline]
pub(crate) fn mix_seed(base_seed: u64, index: u64) -> u64 {
    splitmix64(base_seed ^ index.wrapping_add(1).wrapping_mul(STREAM_SEED_SPACING))
}

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(STREAM_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

/// Run-level seed source handing out one independent stream per phase.
#[derive(Debug)]
pub(crate) struct SeedSplitter {
    base_seed: u64,
    next_stream: u64,
}

impl SeedSplitter {
    /// Uses `seed` when supplied, otherwise draws a seed from OS entropy.
    pub(crate) fn new(seed: Option<u64>) -> Self {
        Self {
            base_seed: seed.unwrap_or_else(rand::random),
            next_stream: 0,
        }
    }

    pub(crate) fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Returns the next stream seed; calls are ordered by the orchestrator.
    pub(crate) fn split(&mut self) -> StreamSeed {
        let seed = mix_seed(self.base_seed, self.next_stream);
        self.next_stream = self.next_stream.wrapping_add(1);
        StreamSeed(seed)
    }
}

/// Seed for one phase; tasks derive per-node generators from it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct StreamSeed(u64);

impl StreamSeed {
    pub(crate) fn rng_for_node(self, node: usize) -> SmallRng {
        SmallRng::seed_from_u64(mix_seed(self.0, node as u64))
    }
}
