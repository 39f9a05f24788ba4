//! Input files shared by the CLI tests.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::arrow_writer::ArrowWriter;
use tempfile::TempDir;

pub(super) type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Three tight pairs of 2-D points: `{0, 1}`, `{2, 3}` and `{4, 5}`.
pub(super) const PAIRED_POINTS: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [0.1, 0.0],
    [5.0, 5.0],
    [5.1, 5.0],
    [10.0, 0.0],
    [10.1, 0.0],
];

/// Writes `rows` as a `features: FixedSizeList<Float32, 2>` column.
pub(super) fn create_parquet_file(
    dir: &TempDir,
    name: &str,
    rows: &[[f32; 2]],
) -> FixtureResult<PathBuf> {
    let path = dir.path().join(name);
    let item_field = Arc::new(Field::new("item", DataType::Float32, false));
    let schema = Arc::new(Schema::new(vec![Field::new(
        "features",
        DataType::FixedSizeList(item_field.clone(), 2),
        false,
    )]));
    let values = Float32Array::from(rows.iter().flatten().copied().collect::<Vec<_>>());
    let list = FixedSizeListArray::try_new(item_field, 2, Arc::new(values) as ArrayRef, None)?;
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(list) as ArrayRef])?;

    let file = File::create(&path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(path)
}

/// Writes `contents` verbatim to `dir/name`.
pub(super) fn create_text_file(dir: &TempDir, name: &str, contents: &str) -> FixtureResult<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}
