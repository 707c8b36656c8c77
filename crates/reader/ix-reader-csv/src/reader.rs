//! Chunked part-file streaming.

use crate::chunk::InventoryChunk;
use crate::columns::{EXPECTED_COLUMNS, KEY_COLUMN, normalize_column_names};
use crate::compression::Compression;
use crate::config::PartReaderConfig;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow_csv::ReaderBuilder;
use arrow_csv::reader::Format;
use async_stream::try_stream;
use futures::Stream;
use ix_error::{IxError, ReaderError, Result};
use ix_traits::ObjectBody;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tracing::{debug, trace, warn};

/// Stream of chunks from one part-file.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<InventoryChunk>> + Send>>;

/// Streams `body` as chunks of at most `config.chunk_size` rows.
///
/// Only one chunk of text is buffered at a time. The column layout is fixed
/// by the first non-empty line; a file whose layout has no `Key` column
/// yields no chunks. Later rows with fewer columns are padded with nulls;
/// rows with more columns than the first fail the stream.
pub fn read_chunks(body: ObjectBody, part_key: &str, config: &PartReaderConfig) -> ChunkStream {
    Box::pin(chunk_stream(
        body,
        part_key.to_string(),
        config.chunk_size.max(1),
    ))
}

fn chunk_stream(
    body: ObjectBody,
    part_key: String,
    chunk_size: usize,
) -> impl Stream<Item = Result<InventoryChunk>> + Send {
    let compression = Compression::from_key(&part_key);

    try_stream! {
        let mut reader = compression.decode(body);
        let mut line = String::new();
        let mut buffer = String::new();
        let mut buffered_rows = 0usize;
        let mut schema: Option<SchemaRef> = None;
        let mut chunk_index = 0usize;

        loop {
            line.clear();
            let bytes_read = reader
                .read_line(&mut line)
                .await
                .map_err(|e| read_error(compression, &part_key, e))?;

            if bytes_read == 0 {
                break;
            }

            if line.trim().is_empty() {
                continue;
            }

            let current_schema = match schema {
                Some(ref schema) => Arc::clone(schema),
                None => {
                    let observed = count_columns(&line, &part_key)?;
                    let names = normalize_column_names(&EXPECTED_COLUMNS, observed);

                    if !names.iter().any(|name| name == KEY_COLUMN) {
                        warn!(
                            part_key = %part_key,
                            columns = observed,
                            "Part-file has no Key column, skipping"
                        );
                        break;
                    }

                    debug!(
                        part_key = %part_key,
                        columns = observed,
                        compression = ?compression,
                        "Inferred part-file layout"
                    );

                    let inferred = text_schema(&names);
                    schema = Some(Arc::clone(&inferred));
                    inferred
                }
            };

            buffer.push_str(&line);
            if !line.ends_with('\n') {
                buffer.push('\n');
            }
            buffered_rows += 1;

            if buffered_rows >= chunk_size {
                let chunk = parse_chunk(&current_schema, &buffer, buffered_rows, &part_key)?;
                trace!(
                    part_key = %part_key,
                    chunk_index = chunk_index,
                    rows = chunk.num_rows(),
                    "Decoded chunk"
                );
                chunk_index += 1;
                buffer.clear();
                buffered_rows = 0;
                yield chunk;
            }
        }

        if buffered_rows > 0 {
            if let Some(ref schema) = schema {
                let chunk = parse_chunk(schema, &buffer, buffered_rows, &part_key)?;
                trace!(
                    part_key = %part_key,
                    chunk_index = chunk_index,
                    rows = chunk.num_rows(),
                    "Decoded final chunk"
                );
                yield chunk;
            }
        }
    }
}

/// Number of delimited fields in one line.
fn count_columns(line: &str, part_key: &str) -> Result<usize> {
    let (schema, _) = Format::default()
        .with_header(false)
        .infer_schema(Cursor::new(line.as_bytes()), Some(1))
        .map_err(|e| {
            IxError::from(ReaderError::Parse(format!(
                "Failed to read columns of '{part_key}': {e}"
            )))
        })?;
    Ok(schema.fields().len())
}

fn text_schema(names: &[String]) -> SchemaRef {
    Arc::new(Schema::new(
        names
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ))
}

fn parse_chunk(
    schema: &SchemaRef,
    buffer: &str,
    rows: usize,
    part_key: &str,
) -> Result<InventoryChunk> {
    let parse_error = |e: arrow::error::ArrowError| {
        IxError::from(ReaderError::Parse(format!(
            "Failed to parse '{part_key}': {e}"
        )))
    };

    let reader = ReaderBuilder::new(Arc::clone(schema))
        .with_header(false)
        .with_batch_size(rows)
        .with_truncated_rows(true)
        .build(Cursor::new(buffer.as_bytes()))
        .map_err(parse_error)?;

    let mut batches = Vec::with_capacity(1);
    for batch in reader {
        batches.push(batch.map_err(parse_error)?);
    }

    let batch = match batches.len() {
        1 => batches.remove(0),
        _ => arrow::compute::concat_batches(schema, &batches).map_err(parse_error)?,
    };

    InventoryChunk::from_text_batch(batch)
}

fn read_error(compression: Compression, part_key: &str, error: std::io::Error) -> IxError {
    match compression {
        Compression::None => ReaderError::Io(format!("Failed to read '{part_key}': {error}")),
        _ => ReaderError::Decompression(format!("Failed to decode '{part_key}': {error}")),
    }
    .into()
}
