use serde::{Deserialize, Serialize};

/// Rows per chunk when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Configuration for the part-file reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartReaderConfig {
    /// Maximum rows held in one chunk
    pub chunk_size: usize,
}

impl Default for PartReaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl PartReaderConfig {
    /// Create a configuration with the default chunk size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size (values below 1 are treated as 1).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}
