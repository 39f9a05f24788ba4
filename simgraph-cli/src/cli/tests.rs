//! Unit tests for argument parsing, command execution and rendering.

use super::commands::{derive_data_source_name, run_command};
use super::test_fixtures::{
    FixtureResult, PAIRED_POINTS, create_parquet_file, create_text_file, temp_dir,
};
use super::{
    Cli, CliError, Command, ExecutionSummary, KnnArgs, MetricArg, OutputFormat, ParquetArgs,
    RunCommand, RunSource, SamplerArg, render_summary, run_cli,
};

use std::path::{Path, PathBuf};

use clap::Parser;
use rstest::rstest;
use simgraph_core::{GraphError, KnnError};
use simgraph_providers_dense::DenseMatrixProviderError;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use simgraph_test_support::tracing::RecordingLayer;

fn exact_args() -> KnnArgs {
    KnnArgs {
        top_k: Some(5),
        sample_rate: Some(1.0),
        seed: Some(7),
        concurrency: Some(1),
        ..KnnArgs::default()
    }
}

fn parquet_command(path: PathBuf, knn: KnnArgs, edges: Option<PathBuf>) -> RunCommand {
    RunCommand {
        knn,
        format: OutputFormat::Human,
        source: RunSource::Parquet(ParquetArgs {
            path,
            column: "features".into(),
            metric: MetricArg::Euclidean,
            edges,
            name: None,
        }),
    }
}

fn run_command_expecting_error(command: RunCommand, panic_msg: &str) -> CliError {
    match run_command(command) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

#[rstest]
#[case::override_name("/tmp/source.parquet", Some("override"), "override")]
#[case::stem_with_extension("/tmp/source.parquet", None, "source")]
#[case::stem_without_extension("/tmp/source", None, "source")]
#[case::missing_stem("", None, "data_source")]
fn derive_data_source_name_selects_expected_name(
    #[case] raw_path: &str,
    #[case] override_name: Option<&'static str>,
    #[case] expected: &str,
) {
    let name = derive_data_source_name(Path::new(raw_path), override_name);
    assert_eq!(name, expected);
}

#[rstest]
fn clap_parses_knn_flags_before_the_source() -> FixtureResult<()> {
    let cli = Cli::try_parse_from([
        "simgraph",
        "run",
        "--top-k",
        "4",
        "--sampler",
        "random-walk",
        "--similarity-cutoff",
        "0.25",
        "--format",
        "json",
        "parquet",
        "vectors.parquet",
        "--column",
        "features",
        "--edges",
        "graph.tsv",
    ])?;
    assert_eq!(cli.output_format(), OutputFormat::Json);
    let Command::Run(run) = cli.command;
    assert_eq!(run.knn.top_k, Some(4));
    assert_eq!(run.knn.sampler, Some(SamplerArg::RandomWalk));
    assert_eq!(run.knn.similarity_cutoff, Some(0.25));
    assert_eq!(run.knn.seed, None);
    let RunSource::Parquet(args) = run.source;
    assert_eq!(args.metric, MetricArg::Cosine);
    assert_eq!(args.edges.as_deref(), Some(Path::new("graph.tsv")));
    Ok(())
}

#[rstest]
#[case::unknown_metric(&["--metric", "manhattan"])]
#[case::missing_column(&[])]
fn clap_rejects_invalid_sources(#[case] extra: &[&str]) {
    let mut args = vec!["simgraph", "run", "parquet", "data.parquet"];
    if !extra.is_empty() {
        args.extend(["--column", "features"]);
        args.extend_from_slice(extra);
    }
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn clap_rejects_unknown_sampler() {
    let args = [
        "simgraph",
        "run",
        "--sampler",
        "greedy",
        "parquet",
        "data.parquet",
        "--column",
        "features",
    ];
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn unset_flags_keep_library_defaults() -> FixtureResult<()> {
    let config = KnnArgs::default().to_config()?;
    assert_eq!(config, simgraph_core::KnnConfig::default());
    Ok(())
}

#[rstest]
fn run_parquet_finds_each_points_partner() -> FixtureResult<()> {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &PAIRED_POINTS)?;
    let cli = Cli {
        command: Command::Run(parquet_command(path, exact_args(), None)),
    };

    let summary = run_cli(cli)?;
    assert_eq!(summary.data_source, "vectors");
    assert_eq!(summary.dimension, 2);
    assert_eq!(summary.result.nodes_compared(), 6);
    assert_eq!(summary.result.size(), 30);
    for (node, partner) in [(0, 1), (1, 0), (2, 3), (3, 2), (4, 5), (5, 4)] {
        assert_eq!(summary.result.neighbours_of(node)[0].id(), partner);
    }
    Ok(())
}

#[rstest]
fn run_parquet_walks_the_supplied_edges() -> FixtureResult<()> {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &PAIRED_POINTS)?;
    let edges = create_text_file(
        &dir,
        "line.tsv",
        "# undirected line\n0\t1\n1\t0\n1\t2\t0.5\n2\t1\t0.5\n\n2\t3\n3\t2\n3\t4\n4\t3\n4\t5\n5\t4\n",
    )?;
    let knn = KnnArgs {
        sampler: Some(SamplerArg::RandomWalk),
        ..exact_args()
    };

    let summary = run_command(parquet_command(path, knn, Some(edges)))?;
    assert!(summary.result.size() > 0);
    for relationship in summary.result.similarity_results() {
        assert_ne!(relationship.source, relationship.target);
        assert!(relationship.target < 6);
    }
    Ok(())
}

#[rstest]
fn run_parquet_rejects_missing_column() -> FixtureResult<()> {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &PAIRED_POINTS)?;
    let mut command = parquet_command(path, exact_args(), None);
    let RunSource::Parquet(args) = &mut command.source;
    args.column = "unknown".into();

    let err = run_command_expecting_error(command, "unknown column must fail");
    assert!(matches!(
        err,
        CliError::Dense(DenseMatrixProviderError::ColumnNotFound { .. })
    ));
    assert_eq!(err.code(), None);
    Ok(())
}

#[rstest]
fn run_command_rejects_zero_top_k() -> FixtureResult<()> {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &PAIRED_POINTS)?;
    let knn = KnnArgs {
        top_k: Some(0),
        ..exact_args()
    };

    let err = run_command_expecting_error(parquet_command(path, knn, None), "top_k 0 must fail");
    assert!(matches!(err, CliError::Core(KnnError::InvalidTopK { got: 0 })));
    assert_eq!(err.code(), Some("KNN_INVALID_TOP_K"));
    Ok(())
}

#[rstest]
fn missing_edge_file_reports_its_path() -> FixtureResult<()> {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &PAIRED_POINTS)?;
    let missing = dir.path().join("missing.tsv");

    let err = run_command_expecting_error(
        parquet_command(path, exact_args(), Some(missing.clone())),
        "missing edge file must fail",
    );
    match err {
        CliError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[rstest]
fn malformed_edge_line_reports_its_number() -> FixtureResult<()> {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &PAIRED_POINTS)?;
    let edges = create_text_file(&dir, "bad.tsv", "0\t1\n# comment\n1 2\n")?;

    let err = run_command_expecting_error(
        parquet_command(path, exact_args(), Some(edges)),
        "space-separated line must fail",
    );
    match err {
        CliError::EdgeFormat { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[rstest]
fn out_of_range_edge_is_a_graph_error() -> FixtureResult<()> {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &PAIRED_POINTS)?;
    let edges = create_text_file(&dir, "far.tsv", "0\t9\n")?;

    let err = run_command_expecting_error(
        parquet_command(path, exact_args(), Some(edges)),
        "endpoint 9 must fail",
    );
    assert!(matches!(
        err,
        CliError::Graph(GraphError::EndpointOutOfBounds {
            node: 9,
            node_count: 6
        })
    ));
    assert_eq!(err.code(), Some("GRAPH_ENDPOINT_OUT_OF_BOUNDS"));
    Ok(())
}

fn summary_of_pairs() -> FixtureResult<ExecutionSummary> {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "pairs.parquet", &PAIRED_POINTS)?;
    Ok(run_command(parquet_command(path, exact_args(), None))?)
}

#[rstest]
fn render_human_lists_header_and_rows() -> FixtureResult<()> {
    let summary = summary_of_pairs()?;
    let mut buffer = Vec::new();
    render_summary(&summary, OutputFormat::Human, &mut buffer)?;
    let text = String::from_utf8(buffer)?;

    assert!(text.contains("data source: pairs"));
    assert!(text.contains("nodes: 6"));
    assert!(text.contains("relationships: 30"));
    let rows: Vec<&str> = text.lines().filter(|line| line.contains('\t')).collect();
    assert_eq!(rows.len(), 30);
    assert!(rows[0].starts_with("0\t1\t"));
    Ok(())
}

#[rstest]
fn render_json_is_a_single_document() -> FixtureResult<()> {
    let summary = summary_of_pairs()?;
    let mut buffer = Vec::new();
    render_summary(&summary, OutputFormat::Json, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    assert_eq!(text.lines().count(), 1);

    let report: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(report["data_source"], "pairs");
    assert_eq!(report["node_count"], 6);
    assert_eq!(report["dimension"], 2);
    assert_eq!(report["relationship_count"], 30);
    let relationships = report["relationships"]
        .as_array()
        .expect("relationships must be an array");
    assert_eq!(relationships.len(), 30);
    assert_eq!(relationships[0]["source"], 0);
    assert_eq!(relationships[0]["target"], 1);
    assert!(report["summary"]["max"].is_number());
    Ok(())
}

#[rstest]
fn run_command_emits_tracing_fields() -> FixtureResult<()> {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &PAIRED_POINTS)?;
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let command = parquet_command(path, exact_args(), None);
    let summary = tracing::subscriber::with_default(subscriber, || run_command(command))?;
    assert_eq!(summary.data_source, "vectors");

    let execute = layer
        .span_named("cli.execute")
        .expect("cli.execute span must exist");
    assert_eq!(execute.fields.get("top_k"), Some(&"5".to_owned()));
    assert_eq!(execute.fields.get("sampler"), Some(&"uniform".to_owned()));
    assert_eq!(execute.fields.get("source"), Some(&"parquet".to_owned()));

    let parquet_span = layer
        .span_named("cli.run_parquet")
        .expect("cli.run_parquet span must exist");
    assert!(
        parquet_span
            .fields
            .get("path")
            .is_some_and(|value| value.ends_with("vectors.parquet"))
    );
    assert_eq!(parquet_span.fields.get("column"), Some(&"features".to_owned()));
    assert_eq!(parquet_span.fields.get("metric"), Some(&"Euclidean".to_owned()));
    assert_eq!(parquet_span.fields.get("edges"), Some(&"<none>".to_owned()));
    assert!(layer.span_named("knn.compute").is_some());

    let completed = layer.events_with_message("command completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].level, Level::INFO);
    assert_eq!(
        completed[0].fields.get("data_source"),
        Some(&"vectors".to_owned())
    );
    assert_eq!(
        completed[0].fields.get("relationships"),
        Some(&"30".to_owned())
    );
    Ok(())
}

#[rstest]
fn random_walk_without_edges_warns() -> FixtureResult<()> {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet", &PAIRED_POINTS)?;
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let knn = KnnArgs {
        sampler: Some(SamplerArg::RandomWalk),
        ..exact_args()
    };

    let command = parquet_command(path, knn, None);
    tracing::subscriber::with_default(subscriber, || run_command(command))?;

    let warnings: Vec<_> = layer
        .events()
        .into_iter()
        .filter(|event| event.level == Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0]
            .message()
            .is_some_and(|message| message.contains("--edges"))
    );
    Ok(())
}

#[rstest]
fn failed_load_records_the_error_on_the_run_span() -> FixtureResult<()> {
    let dir = temp_dir();
    let missing = dir.path().join("missing.parquet");
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let command = parquet_command(missing, exact_args(), None);
    let err = tracing::subscriber::with_default(subscriber, || run_command(command))
        .expect_err("missing file must fail");
    assert!(matches!(err, CliError::Dense(DenseMatrixProviderError::Io(_))));

    let parquet_span = layer
        .span_named("cli.run_parquet")
        .expect("run_parquet span must exist");
    assert!(
        parquet_span
            .fields
            .get("path")
            .is_some_and(|value| value.ends_with("missing.parquet"))
    );
    assert!(layer.events().iter().any(|event| event.level == Level::ERROR));
    Ok(())
}
