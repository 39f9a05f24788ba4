//! Contiguous node-range partitioning for parallel phases.

use std::ops::Range;

/// A contiguous range of node ids handled by one task.
///
/// # Examples
/// ```
/// use simgraph_core::Partition;
///
/// let partition = Partition::new(4, 3);
/// assert_eq!(partition.nodes(), 4..7);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Partition {
    start_node: usize,
    node_count: usize,
}

impl Partition {
    /// Creates a partition covering `node_count` ids starting at `start_node`.
    #[must_use]
    pub fn new(start_node: usize, node_count: usize) -> Self {
        Self {
            start_node,
            node_count,
        }
    }

    /// Returns the first node id in the partition.
    #[must_use]
    #[rustfmt::skip]
    pub fn start_node(&self) -> usize { self.start_node }

    /// Returns the number of nodes in the partition.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.node_count }

    /// Returns the node ids covered by the partition.
    #[must_use]
    pub fn nodes(&self) -> Range<usize> {
        self.start_node..self.start_node + self.node_count
    }
}

/// Splits `0..node_count` into contiguous partitions.
///
/// Each partition holds `max(ceil(node_count / concurrency), min_batch_size)`
/// nodes except possibly the last, so small inputs are not shredded into
/// batches too small to amortise scheduling.
///
/// # Examples
/// ```
/// use simgraph_core::range_partition;
///
/// let partitions = range_partition(4, 10, 1);
/// let sizes: Vec<_> = partitions.iter().map(|p| p.node_count()).collect();
/// assert_eq!(sizes, [3, 3, 3, 1]);
/// ```
#[must_use]
pub fn range_partition(concurrency: usize, node_count: usize, min_batch_size: usize) -> Vec<Partition> {
    if node_count == 0 {
        return Vec::new();
    }
    let batch_size = node_count
        .div_ceil(concurrency.max(1))
        .max(min_batch_size)
        .max(1);
    (0..node_count)
        .step_by(batch_size)
        .map(|start| Partition::new(start, batch_size.min(node_count - start)))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::even_split(4, 8, 1, vec![2, 2, 2, 2])]
    #[case::batch_floor(4, 10, 5, vec![5, 5])]
    #[case::single_worker(1, 7, 1, vec![7])]
    #[case::batch_larger_than_input(8, 3, 100, vec![3])]
    #[case::empty(4, 0, 1, vec![])]
    fn partitions_have_expected_sizes(
        #[case] concurrency: usize,
        #[case] node_count: usize,
        #[case] min_batch_size: usize,
        #[case] expected: Vec<usize>,
    ) {
        let sizes: Vec<usize> = range_partition(concurrency, node_count, min_batch_size)
            .iter()
            .map(Partition::node_count)
            .collect();
        assert_eq!(sizes, expected);
    }

    proptest! {
        #[test]
        fn partitions_cover_every_node_exactly_once(
            concurrency in 1_usize..16,
            node_count in 0_usize..500,
            min_batch_size in 1_usize..64,
        ) {
            let partitions = range_partition(concurrency, node_count, min_batch_size);
            let mut next = 0;
            for partition in &partitions {
                prop_assert_eq!(partition.start_node(), next);
                prop_assert!(partition.node_count() > 0);
                next = partition.nodes().end;
            }
            prop_assert_eq!(next, node_count);
        }
    }
}
