//! Dense feature matrix loaded from Arrow arrays or Parquet files.
use std::{fs::File, path::Path};

use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchReader};
use parquet::{
    arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder},
    file::reader::ChunkReader,
};
use simgraph_core::{SimilarityError, VectorSource};
use tracing::{debug, instrument};

use crate::{
    errors::DenseMatrixProviderError,
    ingest::{MatrixAccumulator, validate_fixed_size_list_field},
};

/// Node features stored as one contiguous row-major `f32` buffer.
///
/// Row `i` holds the features of node `i`. Every value is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrixProvider {
    name: String,
    rows: usize,
    dimension: usize,
    values: Vec<f32>,
}

impl DenseMatrixProvider {
    fn from_accumulator(name: impl Into<String>, matrix: MatrixAccumulator) -> Self {
        let (rows, dimension, values) = matrix.finish();
        debug_assert_eq!(values.len(), rows.saturating_mul(dimension));
        Self {
            name: name.into(),
            rows,
            dimension,
            values,
        }
    }

    /// Returns the name given at load time.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of rows, one per node.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the dimensionality of each row.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the underlying row-major matrix.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.values
    }

    /// Loads data from an Arrow [`FixedSizeListArray`].
    ///
    /// # Errors
    /// Rejects non-`Float32` items, null rows or values, and non-finite values.
    pub fn try_from_fixed_size_list(
        name: impl Into<String>,
        array: &FixedSizeListArray,
    ) -> Result<Self, DenseMatrixProviderError> {
        let mut matrix = MatrixAccumulator::default();
        matrix.push_list(array)?;
        Ok(Self::from_accumulator(name, matrix))
    }

    /// Loads `column` from a sequence of record batches.
    ///
    /// # Errors
    /// Fails when a batch lacks the column, declares a nullable or non-float
    /// list, or disagrees with earlier batches on the dimension.
    pub fn try_from_record_batches<I>(
        name: impl Into<String>,
        column: &str,
        batches: I,
    ) -> Result<Self, DenseMatrixProviderError>
    where
        I: IntoIterator<Item = RecordBatch>,
    {
        let mut matrix = MatrixAccumulator::default();
        for batch in batches {
            matrix.push_batch(&batch, column)?;
        }
        Ok(Self::from_accumulator(name, matrix))
    }

    /// Loads a Parquet column containing `FixedSizeList<Float32, D>` rows.
    ///
    /// # Errors
    /// Returns [`DenseMatrixProviderError::Io`] when the file cannot be opened,
    /// otherwise the same errors as [`Self::try_from_parquet_reader`].
    pub fn try_from_parquet_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        column: &str,
    ) -> Result<Self, DenseMatrixProviderError> {
        let file = File::open(path)?;
        Self::try_from_parquet_reader(name, file, column)
    }

    /// Loads a Parquet column from any chunked reader.
    ///
    /// Only `column` is decoded.
    ///
    /// # Errors
    /// Fails on Parquet decoding errors, a missing column, or any row the
    /// matrix rejects.
    #[instrument(name = "dense.load_parquet", err, skip(name, reader))]
    pub fn try_from_parquet_reader<R>(
        name: impl Into<String>,
        reader: R,
        column: &str,
    ) -> Result<Self, DenseMatrixProviderError>
    where
        R: ChunkReader + Send + 'static,
    {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let mask = ProjectionMask::columns(builder.parquet_schema(), [column]);
        let reader = builder.with_projection(mask).build()?;
        let schema = reader.schema();
        let index = schema
            .index_of(column)
            .map_err(|_| DenseMatrixProviderError::ColumnNotFound {
                column: column.to_owned(),
            })?;
        validate_fixed_size_list_field(schema.field(index), column)?;

        let mut matrix = MatrixAccumulator::default();
        for batch in reader {
            matrix.push_batch(&batch?, column)?;
        }
        let provider = Self::from_accumulator(name, matrix);
        debug!(
            rows = provider.rows,
            dimension = provider.dimension,
            "loaded dense matrix"
        );
        Ok(provider)
    }
}

impl VectorSource for DenseMatrixProvider {
    fn len(&self) -> usize {
        self.rows
    }

    fn vector(&self, node: usize) -> Result<&[f32], SimilarityError> {
        if node >= self.rows {
            return Err(SimilarityError::OutOfBounds { node });
        }
        let start = node
            .checked_mul(self.dimension)
            .ok_or(SimilarityError::OutOfBounds { node })?;
        let end = start
            .checked_add(self.dimension)
            .ok_or(SimilarityError::OutOfBounds { node })?;
        self.values
            .get(start..end)
            .ok_or(SimilarityError::OutOfBounds { node })
    }
}
