use arrow_schema::{ArrowError, DataType};
use thiserror::Error;

/// Failures while loading a dense feature matrix.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DenseMatrixProviderError {
    /// The requested column is absent from the schema.
    #[error("column `{column}` not found in Parquet schema")]
    ColumnNotFound {
        /// Name that was looked up.
        column: String,
    },
    /// The column is not a list of floats.
    #[error("column `{column}` must be a FixedSizeList<Float32, _> but found {actual:?}")]
    InvalidColumnType {
        /// Name of the offending column.
        column: String,
        /// Type found in the schema or batch.
        actual: DataType,
    },
    /// The schema allows nulls in the list or its items.
    #[error("column `{column}` must be non-nullable (nullable child: {nullable_child})")]
    NullableField {
        /// Name of the offending column.
        column: String,
        /// Whether the list items, rather than the list, are nullable.
        nullable_child: bool,
    },
    /// List items are not `Float32`.
    #[error("FixedSizeList child type must be Float32 but found {actual:?}")]
    InvalidListValueType {
        /// Item type found.
        actual: DataType,
    },
    /// The list width is zero or negative.
    #[error("invalid FixedSizeList dimension {actual}")]
    InvalidDimension {
        /// Width declared by the list type.
        actual: i32,
    },
    /// A row is null.
    #[error("row {row} is null")]
    NullRow {
        /// Absolute row index across batches.
        row: usize,
    },
    /// A row holds a null value.
    #[error("row {row} contains null value at position {value_index}")]
    NullValue {
        /// Absolute row index across batches.
        row: usize,
        /// Position of the null within the row.
        value_index: usize,
    },
    /// A row holds NaN or an infinity.
    #[error("row {row} contains non-finite value at position {value_index}")]
    NonFiniteValue {
        /// Absolute row index across batches.
        row: usize,
        /// Position of the value within the row.
        value_index: usize,
    },
    /// A row's length disagrees with the declared width.
    #[error("row {row} has length {actual} but expected {expected}")]
    InvalidRowLength {
        /// Absolute row index across batches.
        row: usize,
        /// Declared width.
        expected: usize,
        /// Observed length.
        actual: usize,
    },
    /// The matrix would not fit in memory addressing limits.
    #[error("matrix with {rows} rows and dimension {dimension} exceeds capacity limits")]
    CapacityOverflow {
        /// Rows in the offending batch.
        rows: usize,
        /// Row width.
        dimension: usize,
    },
    /// Batches declare different widths.
    #[error("inconsistent dimensions across batches: expected {expected}, got {actual}")]
    InconsistentBatchDimension {
        /// Width of the first batch.
        expected: usize,
        /// Width of the offending batch.
        actual: usize,
    },
    /// Arrow failure while decoding.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    /// Parquet failure while reading.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    /// File could not be opened.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
