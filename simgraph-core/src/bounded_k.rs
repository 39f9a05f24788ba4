//! Neighbour-count policy derived from the requested `top_k`.

use crate::error::{KnnError, Result};

/// The three neighbour counts the engine works with.
///
/// `value` is the requested `top_k`, `bounded` clamps it so a node never asks
/// for more neighbours than there are other nodes, and `sampled` is the
/// sample-rate adjusted count used when splitting and sampling reverse
/// neighbours.
///
/// # Examples
/// ```
/// use simgraph_core::BoundedK;
///
/// let k = BoundedK::new(10, 0.5, 4).expect("valid inputs");
/// assert_eq!(k.value(), 10);
/// assert_eq!(k.bounded(), 3);
/// assert_eq!(k.sampled(), 3);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BoundedK {
    value: usize,
    bounded: usize,
    sampled: usize,
}

impl BoundedK {
    /// Derives the bounded and sampled counts for `node_count` nodes.
    ///
    /// # Errors
    /// Returns [`KnnError::InvalidTopK`] when `value` is zero and
    /// [`KnnError::InvalidSampleRate`] when `sample_rate` is not in
    /// `(0.0, 1.0]`.
    pub fn new(value: usize, sample_rate: f64, node_count: usize) -> Result<Self> {
        if value < 1 {
            return Err(KnnError::InvalidTopK { got: value });
        }
        if !(sample_rate > 0.0 && sample_rate <= 1.0) {
            return Err(KnnError::InvalidSampleRate { got: sample_rate });
        }
        let others = node_count.saturating_sub(1);
        let bounded = value.min(others);
        // `ceil(sample_rate * value)` never exceeds `value` because the rate is at most 1.
        let sampled = ((sample_rate * value as f64).ceil() as usize).min(others);
        Ok(Self {
            value,
            bounded,
            sampled,
        })
    }

    /// Returns the requested neighbour count.
    #[must_use]
    #[rustfmt::skip]
    pub fn value(self) -> usize { self.value }

    /// Returns the neighbour-list capacity for this node count.
    #[must_use]
    #[rustfmt::skip]
    pub fn bounded(self) -> usize { self.bounded }

    /// Returns the sample-rate adjusted neighbour count.
    #[must_use]
    #[rustfmt::skip]
    pub fn sampled(self) -> usize { self.sampled }
}
