//! CSV rendering of query results.

use arrow::array::{ArrayRef, BooleanArray, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow_csv::WriterBuilder;
use ix_error::{IxError, Result};
use ix_types::{FolderMatch, PathBucket};
use std::sync::Arc;

/// Renders folder matches as CSV with a header row.
pub fn folders_to_csv(results: &[FolderMatch]) -> Result<String> {
    let schema = Schema::new(vec![
        Field::new("folder_path", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("total_size", DataType::UInt64, false),
        Field::new("file_count", DataType::UInt64, false),
        Field::new("bucket", DataType::Utf8, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            results.iter().map(|r| r.folder_path.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            results.iter().map(|r| r.source.as_str()),
        )),
        Arc::new(UInt64Array::from_iter_values(
            results.iter().map(|r| r.total_size),
        )),
        Arc::new(UInt64Array::from_iter_values(
            results.iter().map(|r| r.file_count),
        )),
        Arc::new(StringArray::from_iter_values(
            results.iter().map(|r| r.bucket.as_str()),
        )),
    ];

    render(schema, columns)
}

/// Renders path buckets as CSV with a header row.
pub fn paths_to_csv(results: &[PathBucket]) -> Result<String> {
    let schema = Schema::new(vec![
        Field::new("path", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("total_size", DataType::UInt64, false),
        Field::new("object_count", DataType::UInt64, false),
        Field::new("is_folder", DataType::Boolean, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            results.iter().map(|r| r.path.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            results.iter().map(|r| r.source.as_str()),
        )),
        Arc::new(UInt64Array::from_iter_values(
            results.iter().map(|r| r.total_size),
        )),
        Arc::new(UInt64Array::from_iter_values(
            results.iter().map(|r| r.object_count),
        )),
        Arc::new(BooleanArray::from(
            results.iter().map(|r| r.is_folder).collect::<Vec<_>>(),
        )),
    ];

    render(schema, columns)
}

fn render(schema: Schema, columns: Vec<ArrayRef>) -> Result<String> {
    let batch = RecordBatch::try_new(Arc::new(schema), columns).map_err(export_error)?;

    let mut writer = WriterBuilder::new().with_header(true).build(Vec::new());
    writer.write(&batch).map_err(export_error)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| IxError::Other(anyhow::anyhow!("CSV export produced invalid UTF-8: {e}")))
}

fn export_error(e: ArrowError) -> IxError {
    IxError::Other(anyhow::anyhow!("CSV export failed: {e}"))
}
