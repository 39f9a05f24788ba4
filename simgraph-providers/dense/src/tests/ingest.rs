use super::{DenseMatrixProvider, DenseMatrixProviderError, support::*};
use crate::ingest::{copy_list_values, validate_fixed_size_list_field};
use arrow_array::RecordBatch;
use arrow_schema::{DataType, Field, Schema};
use rstest::rstest;
use simgraph_core::VectorSource;
use std::sync::Arc;

#[rstest]
fn matrix_provider_from_parquet() {
    let provider = load(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).expect("parquet load");
    assert_eq!(provider.len(), 2);
    assert_eq!(provider.dimension(), 3);
    assert_eq!(provider.name(), "demo");
    assert_eq!(provider.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[rstest]
fn matrix_provider_parquet_missing_column() {
    let bytes = write_parquet(build_array(&[[1.0, 2.0, 3.0]]));
    let err = DenseMatrixProvider::try_from_parquet_reader("demo", bytes, "unknown")
        .expect_err("missing column");
    assert!(matches!(
        err,
        DenseMatrixProviderError::ColumnNotFound { column } if column == "unknown"
    ));
}

#[rstest]
fn matrix_provider_parquet_wrong_type() {
    let field = Field::new("features", DataType::Int32, false);
    let schema = Arc::new(Schema::new(vec![field]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(arrow_array::Int32Array::from(vec![1, 2, 3])) as _],
    )
    .expect("batch");
    let bytes = write_batches(schema, &[batch]);
    let err = DenseMatrixProvider::try_from_parquet_reader("demo", bytes, "features")
        .expect_err("wrong type");
    assert!(matches!(
        err,
        DenseMatrixProviderError::InvalidColumnType { .. }
    ));
}

#[rstest]
fn parquet_batches_are_concatenated() {
    let schema = Arc::new(Schema::new(vec![feature_field(2, false, false)]));
    let first = feature_batch(&[vec![1.0, 2.0]], 2);
    let second = feature_batch(&[vec![3.0, 4.0], vec![5.0, 6.0]], 2);
    let bytes = write_batches(schema, &[first, second]);

    let provider = DenseMatrixProvider::try_from_parquet_reader("demo", bytes, "features")
        .expect("parquet load");
    assert_eq!(provider.rows(), 3);
    assert_eq!(provider.vector(2).expect("row exists"), &[5.0, 6.0]);
}

#[rstest]
fn record_batches_must_agree_on_dimension() {
    let batch_one = feature_batch(&[vec![1.0, 2.0, 3.0]], 3);
    let batch_two = feature_batch(&[vec![4.0, 5.0]], 2);
    let err =
        DenseMatrixProvider::try_from_record_batches("demo", "features", [batch_one, batch_two])
            .expect_err("dimension mismatch must fail");
    assert!(matches!(
        err,
        DenseMatrixProviderError::InconsistentBatchDimension {
            expected: 3,
            actual: 2
        }
    ));
}

#[rstest]
fn no_record_batches_yield_an_empty_matrix() {
    let provider = DenseMatrixProvider::try_from_record_batches("demo", "features", [])
        .expect("empty input is valid");
    assert!(provider.is_empty());
    assert_eq!(provider.dimension(), 0);
}

#[rstest]
#[case::nullable_list(true, false)]
#[case::nullable_items(false, true)]
fn matrix_provider_parquet_nullable_schema(
    #[case] list_nullable: bool,
    #[case] child_nullable: bool,
) {
    let rows = vec![vec![1.0, 2.0, 3.0]];
    let array = build_list_array(&rows, 3, child_nullable);
    let field = feature_field(3, child_nullable, list_nullable);
    let bytes = write_parquet_with_field(field, array);
    let err = DenseMatrixProvider::try_from_parquet_reader("demo", bytes, "features")
        .expect_err("nullable schema must be rejected");
    assert!(matches!(
        err,
        DenseMatrixProviderError::NullableField {
            column,
            nullable_child
        } if column == "features" && nullable_child == child_nullable
    ));
}

#[rstest]
#[case::negative(-1)]
#[case::zero(0)]
fn validate_field_rejects_empty_or_negative_widths(#[case] width: i32) {
    let child = Arc::new(Field::new("item", DataType::Float32, false));
    let field = Field::new("features", DataType::FixedSizeList(child, width), false);
    let err = validate_fixed_size_list_field(&field, "features")
        .expect_err("width must be positive");
    assert!(matches!(
        err,
        DenseMatrixProviderError::InvalidDimension { actual } if actual == width
    ));
}

#[test]
fn copy_list_values_rejects_incorrect_length() {
    let rows = vec![vec![1.0, 2.0]];
    let array = build_list_array(&rows, 2, false);
    let mut values = Vec::new();
    let err = copy_list_values(&array, 3, 0, &mut values)
        .expect_err("incorrect lengths must be rejected");
    assert!(matches!(
        err,
        DenseMatrixProviderError::InvalidRowLength {
            row: 0,
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn copy_list_values_reports_absolute_rows() {
    let rows = vec![vec![1.0, 2.0], vec![f32::INFINITY, 0.0]];
    let array = build_list_array(&rows, 2, false);
    let mut values = Vec::new();
    let err = copy_list_values(&array, 2, 10, &mut values)
        .expect_err("infinite values must be rejected");
    assert!(matches!(
        err,
        DenseMatrixProviderError::NonFiniteValue {
            row: 11,
            value_index: 0
        }
    ));
}
