//! Aggregate result records and query reports.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One folder-level search hit: every matching object grouped under the
/// folder where the search string first appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMatch {
    /// Key prefix up to and including the first matching segment
    pub folder_path: String,

    /// Provenance tag of the manifest the objects came from
    pub source: String,

    /// Sum of object sizes in bytes
    pub total_size: u64,

    /// Number of matching objects
    pub file_count: u64,

    /// Destination bucket that was queried
    pub bucket: String,
}

/// Size and count of every object under one key prefix at a fixed depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathBucket {
    /// First `depth` key segments joined by `/`
    pub path: String,

    /// Provenance tag of the manifest the objects came from
    pub source: String,

    /// Sum of object sizes in bytes
    pub total_size: u64,

    /// Number of objects under the prefix
    pub object_count: u64,

    /// True when at least one object extends below the prefix
    pub is_folder: bool,
}

/// Counters for one fan-out run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Part-files submitted
    pub parts_total: u64,

    /// Part-files merged into the result
    pub parts_succeeded: u64,

    /// Part-files excluded after a failure
    pub parts_failed: u64,

    /// Chunks decoded
    pub chunks_scanned: u64,

    /// Rows decoded
    pub rows_scanned: u64,

    /// Wall-clock time of the fan-out
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl ScanStats {
    /// True when every submitted part-file contributed to the result.
    pub fn is_complete(&self) -> bool {
        self.parts_failed == 0
    }

    /// Rows per second over the whole run, if measurable.
    pub fn rows_per_second(&self) -> Option<f64> {
        let secs = self.duration.as_secs_f64();
        (secs > 0.0).then(|| self.rows_scanned as f64 / secs)
    }
}

/// A part-file that was excluded from a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartFailure {
    /// Part-file key
    pub key: String,

    /// Error text
    pub error: String,
}

/// Folder-grouped search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Folder matches, sorted by folder path then source
    pub results: Vec<FolderMatch>,

    /// Number of folder matches
    pub total_folders: usize,

    /// Sum of sizes over all matches
    pub total_size: u64,

    /// Part-files excluded after a failure
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_parts: Vec<PartFailure>,

    /// Counters for the run
    #[serde(default)]
    pub stats: ScanStats,
}

impl SearchReport {
    /// Builds a report, deriving totals from the result list.
    pub fn new(results: Vec<FolderMatch>) -> Self {
        let total_size = results.iter().map(|r| r.total_size).sum();
        Self {
            total_folders: results.len(),
            total_size,
            results,
            failed_parts: Vec::new(),
            stats: ScanStats::default(),
        }
    }

    /// Total number of matching objects across all folders.
    pub fn total_files(&self) -> u64 {
        self.results.iter().map(|r| r.file_count).sum()
    }
}

/// Path-depth aggregation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSizeReport {
    /// Buckets sorted by path then source
    pub results: Vec<PathBucket>,

    /// Sum of sizes over all buckets
    pub total_size: u64,

    /// Number of buckets
    pub total_paths: usize,

    /// Part-files excluded after a failure
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_parts: Vec<PartFailure>,

    /// Counters for the run
    #[serde(default)]
    pub stats: ScanStats,
}

impl PathSizeReport {
    /// Builds a report, deriving totals from the result list.
    pub fn new(results: Vec<PathBucket>) -> Self {
        let total_size = results.iter().map(|r| r.total_size).sum();
        Self {
            total_paths: results.len(),
            total_size,
            results,
            failed_parts: Vec::new(),
            stats: ScanStats::default(),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
