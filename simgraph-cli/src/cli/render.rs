//! Output rendering for `run` summaries.

use std::io::{self, Write};

use serde::Serialize;
use simgraph_core::{SimilarityResult, SimilaritySummary};

use super::commands::{ExecutionSummary, OutputFormat};

#[derive(Serialize)]
struct JsonReport<'a> {
    data_source: &'a str,
    node_count: usize,
    dimension: usize,
    ran_iterations: usize,
    did_converge: bool,
    node_pairs_considered: u64,
    relationship_count: usize,
    summary: Option<SimilaritySummary>,
    relationships: Vec<SimilarityResult>,
}

/// Writes `summary` to `writer` in the requested `format`.
///
/// The human form is a handful of `key: value` lines followed by one
/// `source\ttarget\tsimilarity` row per relationship. The JSON form is a
/// single document terminated by a newline.
///
/// # Errors
/// Propagates failures from `writer`.
pub fn render_summary(
    summary: &ExecutionSummary,
    format: OutputFormat,
    mut writer: impl Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Human => render_human(summary, writer),
        OutputFormat::Json => {
            let result = &summary.result;
            let report = JsonReport {
                data_source: &summary.data_source,
                node_count: result.nodes_compared(),
                dimension: summary.dimension,
                ran_iterations: result.ran_iterations(),
                did_converge: result.did_converge(),
                node_pairs_considered: result.node_pairs_considered(),
                relationship_count: result.size(),
                summary: result.similarity_summary(),
                relationships: result.similarity_results().collect(),
            };
            serde_json::to_writer(&mut writer, &report)?;
            writeln!(writer)
        }
    }
}

fn render_human(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let result = &summary.result;
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "nodes: {}", result.nodes_compared())?;
    writeln!(writer, "dimension: {}", summary.dimension)?;
    writeln!(writer, "iterations: {}", result.ran_iterations())?;
    writeln!(writer, "converged: {}", result.did_converge())?;
    writeln!(writer, "pairs considered: {}", result.node_pairs_considered())?;
    writeln!(writer, "relationships: {}", result.size())?;
    if let Some(stats) = result.similarity_summary() {
        writeln!(
            writer,
            "similarity: min {:.4} mean {:.4} p50 {:.4} max {:.4}",
            stats.min, stats.mean, stats.p50, stats.max
        )?;
    }
    for relationship in result.similarity_results() {
        writeln!(
            writer,
            "{}\t{}\t{}",
            relationship.source, relationship.target, relationship.similarity
        )?;
    }
    Ok(())
}
