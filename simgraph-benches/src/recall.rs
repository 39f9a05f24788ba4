//! Recall measurement against a brute-force oracle.
//!
//! Benchmarks use these helpers to report how close an NN-Descent run comes
//! to the exact top-k lists for the same metric.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use simgraph_core::{KnnResult, SimilarityComputer, SimilarityError};

/// Integer recall score; convert to a fraction only when reporting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RecallScore {
    /// True neighbours found by the approximate run.
    pub hits: usize,
    /// Number of oracle neighbours that could have been found.
    pub total: usize,
}

impl RecallScore {
    /// Adds another score to this one.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            hits: self.hits + other.hits,
            total: self.total + other.total,
        }
    }

    /// Returns `hits / total`, or `0.0` when nothing was measured.
    #[must_use]
    pub fn fraction(self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.hits as f64 / self.total as f64
    }
}

/// Returns the exact `k` most similar nodes to `node`, most similar first.
///
/// Ties are broken by ascending id and `node` itself is excluded.
///
/// # Errors
/// Returns [`SimilarityError`] if any evaluation fails.
pub fn brute_force_top_k<S>(
    similarity: &S,
    node_count: usize,
    node: usize,
    k: usize,
) -> Result<Vec<usize>, SimilarityError>
where
    S: SimilarityComputer + ?Sized,
{
    let mut scored = Vec::with_capacity(node_count.saturating_sub(1));
    for candidate in (0..node_count).filter(|&candidate| candidate != node) {
        scored.push((candidate, similarity.similarity(node, candidate)?));
    }
    scored.sort_by(|left, right| right.1.total_cmp(&left.1).then(left.0.cmp(&right.0)));
    scored.truncate(k);
    Ok(scored.into_iter().map(|(candidate, _)| candidate).collect())
}

/// Scores the neighbours `result` found for `node` against `oracle`.
#[must_use]
pub fn recall_of(result: &KnnResult, node: usize, oracle: &[usize]) -> RecallScore {
    let expected: HashSet<usize> = oracle.iter().copied().collect();
    let hits = result
        .neighbours_of(node)
        .iter()
        .filter(|neighbour| expected.contains(&neighbour.id()))
        .count();
    RecallScore {
        hits,
        total: oracle.len(),
    }
}

/// Scores `result` against the brute-force oracle for `queries`.
///
/// # Errors
/// Returns [`SimilarityError`] if the oracle cannot score a pair.
pub fn measure_recall<S>(
    result: &KnnResult,
    similarity: &S,
    queries: impl IntoIterator<Item = usize>,
    k: usize,
) -> Result<RecallScore, SimilarityError>
where
    S: SimilarityComputer + ?Sized,
{
    let node_count = result.nodes_compared();
    let mut score = RecallScore::default();
    for node in queries {
        let oracle = brute_force_top_k(similarity, node_count, node, k)?;
        score = score.merge(recall_of(result, node, &oracle));
    }
    Ok(score)
}

/// One row of the recall report.
#[derive(Clone, Debug, PartialEq)]
pub struct RecallMeasurement {
    /// Benchmark label, e.g. the parameter display string. Written quoted.
    pub label: String,
    /// Aggregated recall across all queries.
    pub recall: RecallScore,
    /// Iterations the run needed.
    pub ran_iterations: usize,
    /// Similarity evaluations performed.
    pub node_pairs_considered: u64,
}

impl RecallMeasurement {
    const fn csv_header() -> &'static str {
        "label,recall_hits,recall_total,recall_fraction,ran_iterations,node_pairs_considered\n"
    }

    fn to_csv_row(&self) -> String {
        format!(
            "\"{}\",{},{},{:.6},{},{}\n",
            self.label,
            self.recall.hits,
            self.recall.total,
            self.recall.fraction(),
            self.ran_iterations,
            self.node_pairs_considered,
        )
    }
}

/// Writes `records` as CSV, creating parent directories as needed.
///
/// # Errors
/// Returns [`std::io::Error`] if directory creation or writing fails.
pub fn write_recall_report(
    report_path: impl AsRef<Path>,
    records: &[RecallMeasurement],
) -> Result<PathBuf, std::io::Error> {
    let report_file_path = report_path.as_ref().to_path_buf();
    if let Some(parent) = report_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut output = String::from(RecallMeasurement::csv_header());
    for record in records {
        output.push_str(&record.to_csv_row());
    }
    fs::write(&report_file_path, output)?;
    Ok(report_file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use simgraph_core::{FnSimilarity, Knn, KnnConfigBuilder, KnnNeighbourFilter, NodesOnly};

    fn line_similarity() -> FnSimilarity<impl Fn(usize, usize) -> f64 + Sync> {
        FnSimilarity::new(|a: usize, b: usize| 1.0 / (1.0 + a.abs_diff(b) as f64))
    }

    #[rstest]
    #[case::middle(5, 2, vec![4, 6])]
    #[case::edge(0, 3, vec![1, 2, 3])]
    #[case::more_than_available(1, 10, vec![0, 2, 3, 4, 5, 6, 7, 8, 9])]
    fn oracle_orders_by_similarity_then_id(
        #[case] node: usize,
        #[case] k: usize,
        #[case] expected: Vec<usize>,
    ) {
        let top = brute_force_top_k(&line_similarity(), 10, node, k).expect("metric is total");
        assert_eq!(top, expected);
    }

    #[test]
    fn exhaustive_run_has_perfect_recall() {
        let config = KnnConfigBuilder::new()
            .with_top_k(9)
            .with_sample_rate(1.0)
            .with_random_seed(Some(4))
            .with_concurrency(1)
            .build()
            .expect("valid config");
        let similarity = line_similarity();
        let result = Knn::new(config)
            .compute(&NodesOnly(10), &similarity, &KnnNeighbourFilter)
            .expect("run succeeds");

        let score = measure_recall(&result, &similarity, 0..10, 9).expect("oracle succeeds");
        assert_eq!(score, RecallScore { hits: 90, total: 90 });
        assert_eq!(score.fraction(), 1.0);
    }

    #[rstest]
    #[case::empty(RecallScore::default(), 0.0)]
    #[case::half(RecallScore { hits: 3, total: 6 }, 0.5)]
    fn fraction_handles_empty_scores(#[case] score: RecallScore, #[case] expected: f64) {
        assert_eq!(score.fraction(), expected);
    }

    #[test]
    fn report_is_written_as_csv() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/recall.csv");
        let records = [RecallMeasurement {
            label: "n=10,k=3,uniform".to_owned(),
            recall: RecallScore { hits: 27, total: 30 },
            ran_iterations: 4,
            node_pairs_considered: 120,
        }];

        let written = write_recall_report(&path, &records).expect("report written");
        let contents = std::fs::read_to_string(written).expect("report readable");
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some(RecallMeasurement::csv_header().trim_end()));
        assert_eq!(lines.next(), Some("\"n=10,k=3,uniform\",27,30,0.900000,4,120"));
        assert_eq!(lines.next(), None);
    }
}
