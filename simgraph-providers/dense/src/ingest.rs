//! Accumulates `FixedSizeList<Float32, D>` batches into one row-major buffer.
use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch};
use arrow_schema::{DataType, Field};

use crate::errors::DenseMatrixProviderError;

/// Validates that `field` is a non-nullable list of `Float32` and returns its
/// width.
pub(crate) fn validate_fixed_size_list_field(
    field: &Field,
    column: &str,
) -> Result<usize, DenseMatrixProviderError> {
    let DataType::FixedSizeList(child, width) = field.data_type() else {
        return Err(DenseMatrixProviderError::InvalidColumnType {
            column: column.to_owned(),
            actual: field.data_type().clone(),
        });
    };
    if field.is_nullable() || child.is_nullable() {
        return Err(DenseMatrixProviderError::NullableField {
            column: column.to_owned(),
            nullable_child: child.is_nullable(),
        });
    }
    if child.data_type() != &DataType::Float32 {
        return Err(DenseMatrixProviderError::InvalidListValueType {
            actual: child.data_type().clone(),
        });
    }
    list_width(*width)
}

fn list_width(width: i32) -> Result<usize, DenseMatrixProviderError> {
    usize::try_from(width)
        .ok()
        .filter(|&dimension| dimension > 0)
        .ok_or(DenseMatrixProviderError::InvalidDimension { actual: width })
}

/// Row-major matrix under construction.
#[derive(Debug, Default)]
pub(crate) struct MatrixAccumulator {
    dimension: Option<usize>,
    rows: usize,
    values: Vec<f32>,
}

impl MatrixAccumulator {
    /// Appends the rows of `column` from `batch`.
    pub(crate) fn push_batch(
        &mut self,
        batch: &RecordBatch,
        column: &str,
    ) -> Result<(), DenseMatrixProviderError> {
        let schema = batch.schema();
        let index = schema
            .index_of(column)
            .map_err(|_| DenseMatrixProviderError::ColumnNotFound {
                column: column.to_owned(),
            })?;
        validate_fixed_size_list_field(schema.field(index), column)?;
        let array = batch.column(index);
        let list = array
            .as_any()
            .downcast_ref::<FixedSizeListArray>()
            .ok_or_else(|| DenseMatrixProviderError::InvalidColumnType {
                column: column.to_owned(),
                actual: array.data_type().clone(),
            })?;
        self.push_list(list)
    }

    /// Appends every row of `list`, fixing the dimension on first use.
    pub(crate) fn push_list(
        &mut self,
        list: &FixedSizeListArray,
    ) -> Result<(), DenseMatrixProviderError> {
        let value_type = list.value_type();
        if value_type != DataType::Float32 {
            return Err(DenseMatrixProviderError::InvalidListValueType { actual: value_type });
        }
        let dimension = list_width(list.value_length())?;
        if let Some(expected) = self.dimension
            && expected != dimension
        {
            return Err(DenseMatrixProviderError::InconsistentBatchDimension {
                expected,
                actual: dimension,
            });
        }
        self.dimension = Some(dimension);
        copy_list_values(list, dimension, self.rows, &mut self.values)?;
        self.rows += list.len();
        Ok(())
    }

    /// Returns `(rows, dimension, values)`; an empty input has dimension zero.
    pub(crate) fn finish(self) -> (usize, usize, Vec<f32>) {
        (self.rows, self.dimension.unwrap_or(0), self.values)
    }
}

/// Copies validated rows of `array` onto `out`.
pub(crate) fn copy_list_values(
    array: &FixedSizeListArray,
    dimension: usize,
    start_row: usize,
    out: &mut Vec<f32>,
) -> Result<(), DenseMatrixProviderError> {
    let rows = array.len();
    let additional = rows
        .checked_mul(dimension)
        .ok_or(DenseMatrixProviderError::CapacityOverflow { rows, dimension })?;
    out.reserve(additional);
    for row_index in 0..rows {
        let row = start_row + row_index;
        if array.is_null(row_index) {
            return Err(DenseMatrixProviderError::NullRow { row });
        }
        let item = array.value(row_index);
        let floats = item.as_any().downcast_ref::<Float32Array>().ok_or_else(|| {
            DenseMatrixProviderError::InvalidListValueType {
                actual: item.data_type().clone(),
            }
        })?;
        if floats.len() != dimension {
            return Err(DenseMatrixProviderError::InvalidRowLength {
                row,
                expected: dimension,
                actual: floats.len(),
            });
        }
        if let Some(value_index) = (0..dimension).find(|&idx| floats.is_null(idx)) {
            return Err(DenseMatrixProviderError::NullValue { row, value_index });
        }
        let values = floats.values();
        if let Some(value_index) = values.iter().position(|value| !value.is_finite()) {
            return Err(DenseMatrixProviderError::NonFiniteValue { row, value_index });
        }
        out.extend_from_slice(values);
    }
    Ok(())
}
