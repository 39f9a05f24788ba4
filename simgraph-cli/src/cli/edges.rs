//! Tab-separated edge lists for the random-walk sampler.
//!
//! Each non-empty line holds `source<TAB>target` with an optional third
//! `weight` column. Lines starting with `#` are comments.

use std::fs;
use std::path::Path;

use simgraph_core::AdjacencyGraph;
use tracing::{debug, instrument};

use super::commands::CliError;

/// Reads the edge list at `path` into a graph over `node_count` nodes.
///
/// Missing weights default to `1.0`.
///
/// # Errors
/// Returns [`CliError::Io`] when the file cannot be read,
/// [`CliError::EdgeFormat`] for malformed lines, and [`CliError::Graph`] for
/// endpoints outside `0..node_count` or invalid weights.
#[instrument(name = "cli.load_edges", err, skip(path), fields(path = %path.display()))]
pub fn load_edge_list(path: &Path, node_count: usize) -> Result<AdjacencyGraph, CliError> {
    let contents = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut edges = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let edge = parse_edge(trimmed).map_err(|message| CliError::EdgeFormat {
            path: path.to_path_buf(),
            line: index + 1,
            message,
        })?;
        edges.push(edge);
    }

    let graph = AdjacencyGraph::from_edges(node_count, edges)?;
    debug!(
        relationships = graph.relationship_count(),
        "loaded edge list"
    );
    Ok(graph)
}

fn parse_edge(line: &str) -> Result<(usize, usize, f64), String> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    let (source, target, weight) = match fields.as_slice() {
        [source, target] => (*source, *target, None),
        [source, target, weight] => (*source, *target, Some(*weight)),
        other => {
            return Err(format!(
                "expected 2 or 3 tab-separated fields, found {}",
                other.len()
            ));
        }
    };

    let source = source
        .parse::<usize>()
        .map_err(|err| format!("invalid source `{source}`: {err}"))?;
    let target = target
        .parse::<usize>()
        .map_err(|err| format!("invalid target `{target}`: {err}"))?;
    let weight = match weight {
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|err| format!("invalid weight `{raw}`: {err}"))?,
        None => 1.0,
    };
    Ok((source, target, weight))
}
