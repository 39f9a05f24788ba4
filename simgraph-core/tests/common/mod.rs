//! Fixtures and oracles shared by the integration suites.
#![allow(dead_code, reason = "each suite uses a different subset of helpers")]

use rand::{Rng, SeedableRng, rngs::SmallRng};
use simgraph_core::{DenseVectors, KnnResult, SimilarityComputer};

/// Generates `node_count` random vectors with coordinates in `[-1, 1)`.
#[must_use]
pub fn random_vectors(node_count: usize, dimension: usize, seed: u64) -> DenseVectors {
    let mut rng = SmallRng::seed_from_u64(seed);
    let values = (0..node_count * dimension)
        .map(|_| rng.gen_range(-1.0_f32..1.0))
        .collect();
    DenseVectors::new(dimension, values).expect("random vectors are finite")
}

/// Computes the exact top-`k` neighbours of every node by brute force.
#[must_use]
pub fn exact_neighbours<S>(similarity: &S, node_count: usize, k: usize) -> Vec<Vec<usize>>
where
    S: SimilarityComputer + ?Sized,
{
    (0..node_count)
        .map(|node| {
            let mut scored: Vec<(usize, f64)> = (0..node_count)
                .filter(|&other| other != node)
                .map(|other| {
                    let score = similarity
                        .similarity(node, other)
                        .expect("oracle metric succeeds");
                    (other, score)
                })
                .collect();
            scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            scored.into_iter().take(k).map(|(id, _)| id).collect()
        })
        .collect()
}

/// Fraction of exact neighbours found by the approximate result.
#[must_use]
pub fn recall(result: &KnnResult, exact: &[Vec<usize>]) -> f64 {
    let mut found = 0_usize;
    let mut expected = 0_usize;
    for (node, truth) in exact.iter().enumerate() {
        expected += truth.len();
        found += result
            .neighbours_of(node)
            .iter()
            .filter(|neighbour| truth.contains(&neighbour.id()))
            .count();
    }
    if expected == 0 {
        return 1.0;
    }
    found as f64 / expected as f64
}

/// Checks the structural guarantees every result must satisfy.
pub fn assert_well_formed(result: &KnnResult, node_count: usize, top_k: usize) {
    assert_eq!(result.nodes_compared(), node_count);
    for node in 0..node_count {
        let neighbours = result.neighbours_of(node);
        assert!(neighbours.len() <= top_k, "node {node} holds too many");
        assert!(
            neighbours.iter().all(|n| n.id() != node && n.id() < node_count),
            "node {node} lists itself or an unknown id"
        );
        let mut ids: Vec<usize> = neighbours.iter().map(|n| n.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), neighbours.len(), "node {node} repeats an id");
        assert!(
            neighbours
                .windows(2)
                .all(|pair| pair[0].similarity() >= pair[1].similarity()),
            "node {node} is not ordered by similarity"
        );
    }
}
