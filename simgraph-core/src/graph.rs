//! Graph views consumed by the KNN engine.
//!
//! The engine only needs the node count and, for random-walk sampling, each
//! node's weighted relationships. [`AdjacencyGraph`] is a compact in-memory
//! implementation for callers without their own storage layer.

use crate::error::GraphError;

/// Read-only view over a graph's nodes and weighted relationships.
///
/// Node ids are dense in `0..node_count()`.
///
/// # Examples
/// ```
/// use simgraph_core::{AdjacencyGraph, GraphView};
///
/// let graph = AdjacencyGraph::from_edges(3, [(0, 1, 1.0), (0, 2, 2.0)])?;
/// let mut targets = Vec::new();
/// graph.for_each_relationship(0, &mut |target, _weight| targets.push(target));
/// assert_eq!(targets, [1, 2]);
/// assert_eq!(graph.degree(1), 0);
/// # Ok::<(), simgraph_core::GraphError>(())
/// ```
pub trait GraphView {
    /// Returns the number of nodes.
    fn node_count(&self) -> usize;

    /// Returns the number of outgoing relationships of `node`.
    fn degree(&self, node: usize) -> usize;

    /// Calls `visit` with the target and weight of each outgoing relationship
    /// of `node`, in a stable order.
    fn for_each_relationship(&self, node: usize, visit: &mut dyn FnMut(usize, f64));
}

/// A graph with nodes but no relationships.
///
/// Sufficient for uniform sampling, which never walks the topology.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NodesOnly(pub usize);

impl GraphView for NodesOnly {
    fn node_count(&self) -> usize {
        self.0
    }

    fn degree(&self, _node: usize) -> usize {
        0
    }

    fn for_each_relationship(&self, _node: usize, _visit: &mut dyn FnMut(usize, f64)) {}
}

/// Directed graph stored in compressed sparse row layout.
#[derive(Clone, Debug, PartialEq)]
pub struct AdjacencyGraph {
    offsets: Vec<usize>,
    targets: Vec<usize>,
    weights: Vec<f64>,
}

impl AdjacencyGraph {
    /// Builds a graph from `(source, target, weight)` relationships.
    ///
    /// Relationships keep their input order within each source node.
    ///
    /// # Errors
    /// Returns [`GraphError::EndpointOutOfBounds`] for endpoints outside
    /// `0..node_count` and [`GraphError::InvalidWeight`] for negative or
    /// non-finite weights.
    pub fn from_edges(
        node_count: usize,
        edges: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Result<Self, GraphError> {
        let edges: Vec<(usize, usize, f64)> = edges.into_iter().collect();
        let mut degrees = vec![0_usize; node_count];
        for &(source, target, weight) in &edges {
            for node in [source, target] {
                if node >= node_count {
                    return Err(GraphError::EndpointOutOfBounds { node, node_count });
                }
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(GraphError::InvalidWeight {
                    source_node: source,
                    target,
                    weight,
                });
            }
            degrees[source] += 1;
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        for degree in &degrees {
            let last = offsets.last().copied().unwrap_or(0);
            offsets.push(last + degree);
        }

        let mut cursor: Vec<usize> = offsets[..node_count].to_vec();
        let mut targets = vec![0_usize; edges.len()];
        let mut weights = vec![0.0_f64; edges.len()];
        for (source, target, weight) in edges {
            let slot = cursor[source];
            targets[slot] = target;
            weights[slot] = weight;
            cursor[source] += 1;
        }

        Ok(Self {
            offsets,
            targets,
            weights,
        })
    }

    /// Builds a graph where every relationship has weight `1.0`.
    ///
    /// # Errors
    /// Returns [`GraphError::EndpointOutOfBounds`] for endpoints outside
    /// `0..node_count`.
    pub fn from_unweighted_edges(
        node_count: usize,
        edges: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, GraphError> {
        Self::from_edges(
            node_count,
            edges.into_iter().map(|(source, target)| (source, target, 1.0)),
        )
    }

    /// Returns the total number of relationships.
    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.targets.len()
    }

    fn range(&self, node: usize) -> std::ops::Range<usize> {
        match (self.offsets.get(node), self.offsets.get(node + 1)) {
            (Some(&start), Some(&end)) => start..end,
            _ => 0..0,
        }
    }
}

impl GraphView for AdjacencyGraph {
    fn node_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    fn degree(&self, node: usize) -> usize {
        self.range(node).len()
    }

    fn for_each_relationship(&self, node: usize, visit: &mut dyn FnMut(usize, f64)) {
        let range = self.range(node);
        for (target, weight) in self.targets[range.clone()].iter().zip(&self.weights[range]) {
            visit(*target, *weight);
        }
    }
}
