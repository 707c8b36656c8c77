//! Streaming reader for inventory part-files.
//!
//! A part-file is a compressed, headerless, comma-delimited table with the
//! columns `Bucket, Key, Size, LastModifiedDate, StorageClass` followed by
//! optional extras. This crate turns one part-file body into a stream of
//! bounded [`InventoryChunk`]s:
//!
//! - Compression is detected from the key (`.gz`, `.zst`, or plain)
//! - Column names come from the observed column count, never from the data
//! - `Size` is coerced to `u64`, with anything unparseable mapped to zero
//!
//! # Example
//!
//! ```ignore
//! use futures::StreamExt;
//! use ix_reader_csv::{PartReaderConfig, read_chunks};
//!
//! let body = gateway.get_object("dest", "inv/data/part-0.csv.gz").await?;
//! let mut chunks = read_chunks(body, "inv/data/part-0.csv.gz", &PartReaderConfig::default());
//!
//! while let Some(chunk) = chunks.next().await {
//!     let chunk = chunk?;
//!     for row in chunk.rows() {
//!         println!("{} {}", row.key, row.size);
//!     }
//! }
//! ```

mod chunk;
mod columns;
mod compression;
mod config;
mod reader;

pub use chunk::{InventoryChunk, InventoryRow, coerce_size};
pub use columns::{
    BUCKET_COLUMN, EXPECTED_COLUMNS, KEY_COLUMN, LAST_MODIFIED_COLUMN, SIZE_COLUMN,
    STORAGE_CLASS_COLUMN, normalize_column_names,
};
pub use compression::Compression;
pub use config::PartReaderConfig;
pub use reader::{ChunkStream, read_chunks};
