//! Engine configuration.

use ix_reader_csv::PartReaderConfig;
use serde::{Deserialize, Serialize};

/// Configuration for query execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum part-files fetched and parsed at once
    pub max_concurrent_parts: usize,

    /// Part-file reader settings
    pub reader: PartReaderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_parts: 10,
            reader: PartReaderConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency bound (values below 1 are treated as 1).
    pub fn with_max_concurrent_parts(mut self, max: usize) -> Self {
        self.max_concurrent_parts = max.max(1);
        self
    }

    /// Set the rows per chunk.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.reader = self.reader.with_chunk_size(chunk_size);
        self
    }

    /// Set the reader configuration.
    pub fn with_reader(mut self, reader: PartReaderConfig) -> Self {
        self.reader = reader;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_builder() {
        let config = EngineConfig::new()
            .with_max_concurrent_parts(0)
            .with_chunk_size(500);

        assert_eq!(config.max_concurrent_parts, 1);
        assert_eq!(config.reader.chunk_size, 500);
        assert_eq!(EngineConfig::default().max_concurrent_parts, 10);
    }
}
