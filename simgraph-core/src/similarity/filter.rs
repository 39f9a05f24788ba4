//! Predicates that veto candidate neighbour pairs.

/// Decides whether a candidate pair may become neighbours.
pub trait NeighbourFilter: Sync {
    /// Returns `true` when `target` must never appear in `source`'s list.
    fn exclude_node_pair(&self, source: usize, target: usize) -> bool;
}

/// Default filter: a node is never its own neighbour.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct KnnNeighbourFilter;

impl NeighbourFilter for KnnNeighbourFilter {
    fn exclude_node_pair(&self, source: usize, target: usize) -> bool {
        source == target
    }
}

/// Adapts a closure into a [`NeighbourFilter`].
///
/// Self-pairs stay excluded whatever the closure returns.
///
/// # Examples
/// ```
/// use simgraph_core::{FnNeighbourFilter, NeighbourFilter};
///
/// let same_parity_only = FnNeighbourFilter::new(|a, b| a % 2 != b % 2);
/// assert!(same_parity_only.exclude_node_pair(1, 2));
/// assert!(same_parity_only.exclude_node_pair(3, 3));
/// assert!(!same_parity_only.exclude_node_pair(2, 4));
/// ```
#[derive(Clone, Copy)]
pub struct FnNeighbourFilter<F> {
    predicate: F,
}

impl<F> FnNeighbourFilter<F>
where
    F: Fn(usize, usize) -> bool + Sync,
{
    /// Wraps `predicate`, which returns `true` for pairs to exclude.
    #[must_use]
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> NeighbourFilter for FnNeighbourFilter<F>
where
    F: Fn(usize, usize) -> bool + Sync,
{
    fn exclude_node_pair(&self, source: usize, target: usize) -> bool {
        source == target || (self.predicate)(source, target)
    }
}

impl<T: NeighbourFilter + ?Sized> NeighbourFilter for &T {
    fn exclude_node_pair(&self, source: usize, target: usize) -> bool {
        (**self).exclude_node_pair(source, target)
    }
}
