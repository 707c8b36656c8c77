//! Inventory manifest types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File name every inventory export uses for its manifest document.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// A manifest discovered by listing a destination bucket.
///
/// Carries only what listing reveals; the part-file list is read separately
/// into a [`Manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedManifest {
    /// Bucket the manifest is stored in
    pub destination_bucket: String,

    /// Bucket the manifest describes, taken from the key path
    pub source_bucket: String,

    /// Manifest key within the destination bucket
    pub key: String,

    /// Modification time, used only to pick the latest snapshot
    pub last_modified: Option<DateTime<Utc>>,
}

/// A fetched manifest: one inventory snapshot and its part-files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Bucket the manifest was read from
    pub bucket: String,

    /// Manifest key
    pub key: String,

    /// Part-files in manifest order
    pub files: Vec<PartFileDescriptor>,
}

impl Manifest {
    /// Number of part-files in this snapshot.
    pub fn part_count(&self) -> usize {
        self.files.len()
    }
}

/// A compressed delimited part-file referenced by a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartFileDescriptor {
    /// Storage key of the part-file
    pub key: String,

    /// Provenance tag inherited from the manifest that listed this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl PartFileDescriptor {
    /// Creates a descriptor without a provenance tag.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: None,
        }
    }

    /// Attaches a provenance tag.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The provenance tag, or an empty string when unset.
    pub fn source_or_empty(&self) -> &str {
        self.source.as_deref().unwrap_or("")
    }
}
