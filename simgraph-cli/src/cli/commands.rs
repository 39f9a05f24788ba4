//! Command implementations and argument parsing for the simgraph CLI.

use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use simgraph_core::{
    GraphError, Knn, KnnConfig, KnnConfigBuilder, KnnError, KnnNeighbourFilter, KnnResult,
    NodesOnly, SamplerKind, TracingProgress, VectorMetric, VectorSimilarity, VectorSource,
};
use simgraph_providers_dense::{DenseMatrixProvider, DenseMatrixProviderError};
use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

use super::edges::load_edge_list;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "simgraph",
    about = "Build approximate k-nearest-neighbour similarity graphs."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Returns the output format requested by the command.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        match &self.command {
            Command::Run(run) => run.format,
        }
    }
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Compute the top-k similarity graph of a feature file.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Engine parameters; unset flags keep the library defaults.
    #[command(flatten)]
    pub knn: KnnArgs,

    /// How to print the result.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Feature source.
    #[command(subcommand)]
    pub source: RunSource,
}

/// NN-Descent parameters exposed as flags.
#[derive(Debug, Args, Clone, Default)]
pub struct KnnArgs {
    /// Neighbours kept per node.
    #[arg(long)]
    pub top_k: Option<usize>,
    /// Fraction of each list sampled per iteration, in `(0, 1]`.
    #[arg(long)]
    pub sample_rate: Option<f64>,
    /// Convergence threshold as a fraction of possible updates.
    #[arg(long)]
    pub delta_threshold: Option<f64>,
    /// Upper bound on refinement iterations.
    #[arg(long)]
    pub max_iterations: Option<usize>,
    /// Random comparisons per node per iteration.
    #[arg(long)]
    pub random_joins: Option<usize>,
    /// Probability of replacing a tied worst neighbour.
    #[arg(long)]
    pub perturbation_rate: Option<f64>,
    /// Drop relationships below this similarity after the run.
    #[arg(long)]
    pub similarity_cutoff: Option<f64>,
    /// Strategy for the initial neighbour lists.
    #[arg(long, value_enum)]
    pub sampler: Option<SamplerArg>,
    /// Seed for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Worker threads.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Smallest node range handed to one task.
    #[arg(long)]
    pub min_batch_size: Option<usize>,
}

impl KnnArgs {
    /// Applies the supplied flags on top of [`KnnConfigBuilder`] defaults.
    ///
    /// # Errors
    /// Returns the builder's validation error for out-of-range values.
    pub fn to_config(&self) -> Result<KnnConfig, KnnError> {
        let mut builder = KnnConfigBuilder::new();
        if let Some(top_k) = self.top_k {
            builder = builder.with_top_k(top_k);
        }
        if let Some(rate) = self.sample_rate {
            builder = builder.with_sample_rate(rate);
        }
        if let Some(threshold) = self.delta_threshold {
            builder = builder.with_delta_threshold(threshold);
        }
        if let Some(iterations) = self.max_iterations {
            builder = builder.with_max_iterations(iterations);
        }
        if let Some(joins) = self.random_joins {
            builder = builder.with_random_joins(joins);
        }
        if let Some(rate) = self.perturbation_rate {
            builder = builder.with_perturbation_rate(rate);
        }
        if let Some(cutoff) = self.similarity_cutoff {
            builder = builder.with_similarity_cutoff(cutoff);
        }
        if let Some(sampler) = self.sampler {
            builder = builder.with_sampler(sampler.into());
        }
        if let Some(concurrency) = self.concurrency {
            builder = builder.with_concurrency(concurrency);
        }
        if let Some(size) = self.min_batch_size {
            builder = builder.with_min_batch_size(size);
        }
        builder.with_random_seed(self.seed).build()
    }
}

/// Feature sources supported by `run`.
#[derive(Debug, Subcommand, Clone)]
pub enum RunSource {
    /// Read a Parquet file containing a `FixedSizeList<Float32, D>` column.
    Parquet(ParquetArgs),
}

/// Parquet ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct ParquetArgs {
    /// Path to the Parquet file containing feature vectors.
    pub path: PathBuf,

    /// Column containing `FixedSizeList<Float32, D>` rows.
    #[arg(long)]
    pub column: String,

    /// Vector metric used to score node pairs.
    #[arg(long, value_enum, default_value_t = MetricArg::Cosine)]
    pub metric: MetricArg,

    /// TSV edge list (`source`, `target`, optional `weight`) for the
    /// random-walk sampler.
    #[arg(long)]
    pub edges: Option<PathBuf>,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Initial samplers selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SamplerArg {
    /// Distinct nodes drawn uniformly.
    Uniform,
    /// Nodes reached by restarting random walks over `--edges`.
    RandomWalk,
}

impl From<SamplerArg> for SamplerKind {
    fn from(value: SamplerArg) -> Self {
        match value {
            SamplerArg::Uniform => Self::Uniform,
            SamplerArg::RandomWalk => Self::RandomWalk,
        }
    }
}

/// Vector metrics selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    /// Cosine similarity clamped at zero.
    Cosine,
    /// `1 / (1 + euclidean distance)`.
    Euclidean,
    /// Pearson correlation clamped at zero.
    Pearson,
}

impl From<MetricArg> for VectorMetric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Cosine => Self::Cosine,
            MetricArg::Euclidean => Self::Euclidean,
            MetricArg::Pearson => Self::Pearson,
        }
    }
}

/// Result rendering styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Summary lines followed by `source\ttarget\tsimilarity` rows.
    #[default]
    Human,
    /// A single JSON document.
    Json,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be opened or read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A line of the edge list could not be parsed.
    #[error("{path}:{line}: {message}")]
    EdgeFormat {
        /// Edge list path.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
    /// Dense matrix ingestion failed.
    #[error(transparent)]
    Dense(#[from] DenseMatrixProviderError),
    /// The edge list described an invalid graph.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Configuration or computation failed.
    #[error(transparent)]
    Core(#[from] KnnError),
}

impl CliError {
    /// Stable code of the underlying library error, when there is one.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Core(core) => Some(core.code().as_str()),
            Self::Graph(graph) => Some(graph.code().as_str()),
            Self::Io { .. } | Self::EdgeFormat { .. } | Self::Dense(_) => None,
        }
    }
}

/// Outcome of a `run` command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the feature source.
    pub data_source: String,
    /// Feature dimensionality.
    pub dimension: usize,
    /// Top-k relationships and run statistics.
    pub result: KnnResult,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading inputs, validating flags, or computing
/// the graph fails.
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(top_k = field::Empty, sampler = field::Empty, source = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let config = command.knn.to_config()?;
    let span = Span::current();
    span.record("top_k", config.top_k().get());
    span.record("sampler", field::display(config.sampler()));

    let summary = match command.source {
        RunSource::Parquet(args) => {
            span.record("source", field::display("parquet"));
            run_parquet(config, args)?
        }
    };

    info!(
        data_source = summary.data_source.as_str(),
        relationships = summary.result.size(),
        ran_iterations = summary.result.ran_iterations(),
        did_converge = summary.result.did_converge(),
        "command completed"
    );
    Ok(summary)
}

#[instrument(
    name = "cli.run_parquet",
    err,
    skip(config, args),
    fields(
        path = field::Empty,
        column = field::Empty,
        metric = field::Empty,
        edges = field::Empty,
    ),
)]
pub(super) fn run_parquet(
    config: KnnConfig,
    args: ParquetArgs,
) -> Result<ExecutionSummary, CliError> {
    let ParquetArgs {
        path,
        column,
        metric,
        edges,
        name,
    } = args;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record("column", field::display(&column));
    span.record("metric", field::debug(metric));
    span.record(
        "edges",
        field::display(edges.as_deref().map_or("<none>".into(), Path::to_string_lossy)),
    );

    let chosen_name = derive_data_source_name(&path, name.as_deref());
    let provider = DenseMatrixProvider::try_from_parquet_path(chosen_name, &path, &column)?;
    let data_source = provider.name().to_owned();
    let dimension = provider.dimension();
    let node_count = provider.len();
    let similarity = VectorSimilarity::new(provider, metric.into());

    let progress = TracingProgress::new();
    let knn = Knn::new(config).with_progress(&progress);
    let result = match edges {
        Some(edges) => {
            let graph = load_edge_list(&edges, node_count)?;
            knn.compute(&graph, &similarity, &KnnNeighbourFilter)?
        }
        None => {
            if knn.config().sampler() == SamplerKind::RandomWalk {
                warn!("random-walk sampler without --edges; every node starts isolated");
            }
            knn.compute(&NodesOnly(node_count), &similarity, &KnnNeighbourFilter)?
        }
    };
    Ok(ExecutionSummary {
        data_source,
        dimension,
        result,
    })
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "data_source".to_owned(), ToOwned::to_owned)
}
