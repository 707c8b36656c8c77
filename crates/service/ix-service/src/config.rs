//! Request layer configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default manifest cache file name.
pub const DEFAULT_CACHE_FILE: &str = "manifest_cache.json";

/// Default bucket history file name.
pub const DEFAULT_HISTORY_FILE: &str = "bucket_history.json";

/// Where the request layer keeps its state files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory holding the state files
    pub state_dir: PathBuf,

    /// Manifest cache file name within `state_dir`
    pub cache_file: String,

    /// Bucket history file name within `state_dir`
    pub history_file: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("."),
            cache_file: DEFAULT_CACHE_FILE.to_string(),
            history_file: DEFAULT_HISTORY_FILE.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the state directory.
    pub fn with_state_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.state_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the manifest cache file name.
    pub fn with_cache_file(mut self, name: impl Into<String>) -> Self {
        self.cache_file = name.into();
        self
    }

    /// Set the bucket history file name.
    pub fn with_history_file(mut self, name: impl Into<String>) -> Self {
        self.history_file = name.into();
        self
    }

    pub fn cache_path(&self) -> PathBuf {
        self.state_dir.join(&self.cache_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.state_dir.join(&self.history_file)
    }
}
