//! Compression detection and decoding.

use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use ix_traits::ObjectBody;
use serde::{Deserialize, Serialize};
use tokio::io::BufReader;

const BUFFER_CAPACITY: usize = 8192;

/// Compression type detected from the part-file key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    /// Detect compression from a key or file name.
    pub fn from_key(key: &str) -> Self {
        let key_lower = key.to_lowercase();
        if key_lower.ends_with(".gz") || key_lower.ends_with(".gzip") {
            Compression::Gzip
        } else if key_lower.ends_with(".zst") || key_lower.ends_with(".zstd") {
            Compression::Zstd
        } else {
            Compression::None
        }
    }

    /// Wraps `body` in the matching decoder.
    pub fn decode(self, body: ObjectBody) -> ObjectBody {
        match self {
            Compression::None => body,
            Compression::Gzip => {
                let mut decoder = GzipDecoder::new(body);
                decoder.multiple_members(true);
                Box::pin(BufReader::with_capacity(BUFFER_CAPACITY, decoder))
            }
            Compression::Zstd => {
                let decoder = ZstdDecoder::new(body);
                Box::pin(BufReader::with_capacity(BUFFER_CAPACITY, decoder))
            }
        }
    }
}
