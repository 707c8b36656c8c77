//! Request and response shapes.

use ix_error::{ErrorCategory, IxError, classify_error, user_message};
use ix_types::{PartFailure, PathSizeReport, ScanStats, SearchReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Locate the latest manifests in one or more destination buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchManifestsRequest {
    pub bucket_names: Vec<String>,
}

/// One cached manifest as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedManifest {
    /// Manifest key in the destination bucket
    pub key: String,

    /// When the manifest entered the cache, `YYYY-MM-DD HH:MM:SS`
    pub added_date: String,

    /// Bucket the manifest describes
    pub source_bucket: String,
}

/// Cached manifests per requested destination bucket.
pub type ManifestListing = BTreeMap<String, Vec<CachedManifest>>;

/// Folder-grouped search over the part-files of `manifest_keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub bucket_name: String,
    pub manifest_keys: Vec<String>,
    pub search_string: String,
}

/// Size per path prefix over the part-files of `manifest_keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSizeRequest {
    pub bucket_name: String,
    pub manifest_keys: Vec<String>,
    pub path_depth: i64,
}

/// Which query to re-run for a CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportRequest {
    Search(SearchRequest),
    PathSize(PathSizeRequest),
}

impl ExportRequest {
    /// Suggested download file name.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Search(_) => "search_results.csv",
            Self::PathSize(_) => "path_sizes.csv",
        }
    }
}

/// Search results tagged with their result type.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// Always `"folders"`
    #[serde(rename = "type")]
    pub kind: &'static str,

    #[serde(flatten)]
    pub report: SearchReport,
}

impl From<SearchReport> for SearchResponse {
    fn from(report: SearchReport) -> Self {
        Self {
            kind: "folders",
            report,
        }
    }
}

/// Path-size results.
pub type PathSizeResponse = PathSizeReport;

/// Rendered CSV plus what the underlying query could not read.
#[derive(Debug, Clone)]
pub struct ExportResponse {
    /// Suggested download name, see [`ExportRequest::file_name`]
    pub file_name: &'static str,

    pub csv: String,

    /// Part-files left out of the exported rows
    pub failed_parts: Vec<PartFailure>,

    pub stats: ScanStats,
}

impl ExportResponse {
    /// True when every part-file contributed to the export.
    pub fn is_complete(&self) -> bool {
        self.failed_parts.is_empty()
    }
}

/// Error body returned in place of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Message safe to show to an operator
    pub error: String,

    pub category: ErrorCategory,

    /// HTTP-style status code
    pub status: u16,
}

impl From<&IxError> for ErrorResponse {
    fn from(error: &IxError) -> Self {
        let category = classify_error(error);
        let message = match category {
            ErrorCategory::Internal => format!("An unexpected error occurred: {error}"),
            _ => user_message(error),
        };
        Self {
            error: message,
            category,
            status: category.status_code(),
        }
    }
}
