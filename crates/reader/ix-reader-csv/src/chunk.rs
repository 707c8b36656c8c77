//! Decoded row chunks.

use crate::columns::{
    BUCKET_COLUMN, KEY_COLUMN, LAST_MODIFIED_COLUMN, SIZE_COLUMN, STORAGE_CLASS_COLUMN,
};
use arrow::array::{Array, ArrayRef, AsArray, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use ix_error::{ReaderError, Result};
use std::sync::Arc;

/// Parses a `Size` cell.
///
/// Unsigned integers parse directly, finite non-negative decimals are
/// truncated, and anything else (empty, negative, garbage) is zero.
pub fn coerce_size(raw: &str) -> u64 {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return value;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value as u64,
        _ => 0,
    }
}

/// One bounded slice of a part-file.
///
/// The wrapped batch keeps every observed column as text except `Size`,
/// which is always present as `UInt64`.
#[derive(Debug, Clone)]
pub struct InventoryChunk {
    batch: RecordBatch,
    bucket: Option<StringArray>,
    key: StringArray,
    size: UInt64Array,
    last_modified: Option<StringArray>,
    storage_class: Option<StringArray>,
}

impl InventoryChunk {
    /// Builds a chunk from a text-only batch whose column names are already
    /// normalized. Fails when the batch has no `Key` column.
    pub fn from_text_batch(batch: RecordBatch) -> Result<Self> {
        let schema = batch.schema();

        let key = text_column(&batch, KEY_COLUMN)?
            .ok_or_else(|| ReaderError::Parse("Chunk has no Key column".to_string()))?;

        let size = match text_column(&batch, SIZE_COLUMN)? {
            Some(raw) => UInt64Array::from_iter_values(
                (0..raw.len()).map(|i| if raw.is_null(i) { 0 } else { coerce_size(raw.value(i)) }),
            ),
            None => UInt64Array::from_iter_values(std::iter::repeat_n(0, batch.num_rows())),
        };

        let mut fields: Vec<Field> = Vec::with_capacity(schema.fields().len() + 1);
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len() + 1);
        let mut size_placed = false;

        for (field, column) in schema.fields().iter().zip(batch.columns()) {
            if field.name() == SIZE_COLUMN {
                fields.push(Field::new(SIZE_COLUMN, DataType::UInt64, false));
                columns.push(Arc::new(size.clone()));
                size_placed = true;
            } else {
                fields.push(field.as_ref().clone());
                columns.push(Arc::clone(column));
            }
        }

        if !size_placed {
            fields.push(Field::new(SIZE_COLUMN, DataType::UInt64, false));
            columns.push(Arc::new(size.clone()));
        }

        let normalized = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
            .map_err(|e| ReaderError::Parse(format!("Failed to normalize chunk: {e}")))?;

        Ok(Self {
            bucket: text_column(&batch, BUCKET_COLUMN)?,
            last_modified: text_column(&batch, LAST_MODIFIED_COLUMN)?,
            storage_class: text_column(&batch, STORAGE_CLASS_COLUMN)?,
            batch: normalized,
            key,
            size,
        })
    }

    /// Number of rows in the chunk, including rows without a key.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// The normalized batch.
    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Key of row `index`; `None` when null or empty.
    pub fn key(&self, index: usize) -> Option<&str> {
        if self.key.is_null(index) {
            return None;
        }
        let key = self.key.value(index);
        (!key.is_empty()).then_some(key)
    }

    /// Coerced size of row `index`.
    pub fn size(&self, index: usize) -> u64 {
        self.size.value(index)
    }

    /// Rows that carry a key.
    pub fn rows(&self) -> impl Iterator<Item = InventoryRow<'_>> + '_ {
        (0..self.num_rows()).filter_map(move |i| {
            Some(InventoryRow {
                bucket: optional_text(self.bucket.as_ref(), i),
                key: self.key(i)?,
                size: self.size(i),
                last_modified_date: optional_text(self.last_modified.as_ref(), i),
                storage_class: optional_text(self.storage_class.as_ref(), i),
            })
        })
    }
}

/// Borrowed view of one inventory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryRow<'a> {
    pub bucket: Option<&'a str>,
    pub key: &'a str,
    pub size: u64,
    pub last_modified_date: Option<&'a str>,
    pub storage_class: Option<&'a str>,
}

fn text_column(batch: &RecordBatch, name: &str) -> Result<Option<StringArray>> {
    let Some(column) = batch.column_by_name(name) else {
        return Ok(None);
    };
    let strings = column
        .as_string_opt::<i32>()
        .ok_or_else(|| ReaderError::Parse(format!("Column '{name}' is not text")))?;
    Ok(Some(strings.clone()))
}

fn optional_text(column: Option<&StringArray>, index: usize) -> Option<&str> {
    let column = column?;
    if column.is_null(index) {
        None
    } else {
        Some(column.value(index))
    }
}
