//! Command-line interface for building similarity graphs.
//!
//! `simgraph run [knn options] parquet <path> --column <col>` loads one dense
//! feature vector per node, optionally reads a TSV edge list for the
//! random-walk sampler, and prints the resulting top-k relationships.

mod commands;
mod edges;
mod render;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, KnnArgs, MetricArg, OutputFormat, ParquetArgs,
    RunCommand, RunSource, SamplerArg, run_cli,
};
pub use edges::load_edge_list;
pub use render::render_summary;

#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
mod tests;
