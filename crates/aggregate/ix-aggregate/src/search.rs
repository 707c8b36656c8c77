//! Folder-grouped key search.

use crate::{Aggregator, Mergeable};
use ix_error::{IxError, Result};
use ix_types::FolderMatch;
use std::collections::BTreeMap;

/// Prefix of `key` through the first segment containing `needle_lower`.
///
/// `needle_lower` must already be lowercase; segments are compared
/// case-insensitively. When no single segment contains the needle the whole
/// key is returned.
pub fn folder_path_for<'a>(key: &'a str, needle_lower: &str) -> &'a str {
    let mut end = 0;
    for segment in key.split('/') {
        end += segment.len();
        if segment.to_lowercase().contains(needle_lower) {
            return &key[..end];
        }
        end += 1;
    }
    key
}

/// Running totals for one `(folder, source)` group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderTotals {
    pub total_size: u64,
    pub file_count: u64,
}

/// Search partial: folder path → source → totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderMatchSet {
    groups: BTreeMap<String, BTreeMap<String, FolderTotals>>,
}

impl FolderMatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` objects totalling `size` bytes to a group.
    pub fn add(&mut self, folder_path: &str, source: &str, size: u64, count: u64) {
        let by_source = match self.groups.get_mut(folder_path) {
            Some(by_source) => by_source,
            None => self.groups.entry(folder_path.to_string()).or_default(),
        };
        let totals = match by_source.get_mut(source) {
            Some(totals) => totals,
            None => by_source.entry(source.to_string()).or_default(),
        };
        totals.total_size += size;
        totals.file_count += count;
    }

    /// Totals of one group, if present.
    pub fn get(&self, folder_path: &str, source: &str) -> Option<FolderTotals> {
        self.groups.get(folder_path)?.get(source).copied()
    }

    /// Final records sorted by folder path, then source.
    pub fn into_results(self, bucket: &str) -> Vec<FolderMatch> {
        self.groups
            .into_iter()
            .flat_map(|(folder_path, by_source)| {
                by_source.into_iter().map(move |(source, totals)| FolderMatch {
                    folder_path: folder_path.clone(),
                    source,
                    total_size: totals.total_size,
                    file_count: totals.file_count,
                    bucket: bucket.to_string(),
                })
            })
            .collect()
    }
}

impl Mergeable for FolderMatchSet {
    fn merge(&mut self, other: Self) {
        for (folder_path, by_source) in other.groups {
            for (source, totals) in by_source {
                self.add(&folder_path, &source, totals.total_size, totals.file_count);
            }
        }
    }

    fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }
}

/// Case-insensitive substring search over keys.
#[derive(Debug, Clone)]
pub struct SearchAggregator {
    needle_lower: String,
}

impl SearchAggregator {
    /// Fails on an empty search string.
    pub fn new(needle: &str) -> Result<Self> {
        if needle.is_empty() {
            return Err(IxError::InvalidInput(
                "Search string must not be empty".to_string(),
            ));
        }
        Ok(Self {
            needle_lower: needle.to_lowercase(),
        })
    }

    /// Whether `key` is a search hit.
    pub fn matches(&self, key: &str) -> bool {
        key.to_lowercase().contains(&self.needle_lower)
    }
}

impl Aggregator for SearchAggregator {
    type Partial = FolderMatchSet;

    fn observe(&self, key: &str, size: u64, source: &str, partial: &mut FolderMatchSet) {
        if self.matches(key) {
            partial.add(folder_path_for(key, &self.needle_lower), source, size, 1);
        }
    }

    fn name(&self) -> &'static str {
        "search"
    }
}
