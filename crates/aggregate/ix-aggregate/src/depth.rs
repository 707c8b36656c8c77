//! Size and count by path prefix.

use crate::{Aggregator, Mergeable};
use ix_error::{IxError, Result};
use ix_types::PathBucket;
use std::collections::BTreeMap;

/// First `depth` `/`-separated segments of `key`, and whether the key
/// continues below them.
///
/// Returns `None` when the key has fewer than `depth` segments.
pub fn path_at_depth(key: &str, depth: usize) -> Option<(&str, bool)> {
    if depth == 0 {
        return None;
    }

    let mut separators = 0;
    for (index, byte) in key.bytes().enumerate() {
        if byte == b'/' {
            separators += 1;
            if separators == depth {
                return Some((&key[..index], true));
            }
        }
    }

    (separators + 1 == depth).then_some((key, false))
}

/// Running totals for one `(path, source)` group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathTotals {
    pub total_size: u64,
    pub object_count: u64,
    pub is_folder: bool,
}

/// Path-depth partial: path → source → totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathBucketSet {
    groups: BTreeMap<String, BTreeMap<String, PathTotals>>,
}

impl PathBucketSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds totals into a group. `is_folder` is OR-ed.
    pub fn add(&mut self, path: &str, source: &str, totals: PathTotals) {
        let by_source = match self.groups.get_mut(path) {
            Some(by_source) => by_source,
            None => self.groups.entry(path.to_string()).or_default(),
        };
        let current = match by_source.get_mut(source) {
            Some(current) => current,
            None => by_source.entry(source.to_string()).or_default(),
        };
        current.total_size += totals.total_size;
        current.object_count += totals.object_count;
        current.is_folder |= totals.is_folder;
    }

    pub fn get(&self, path: &str, source: &str) -> Option<PathTotals> {
        self.groups.get(path)?.get(source).copied()
    }

    /// Final records sorted by path, then source.
    pub fn into_results(self) -> Vec<PathBucket> {
        self.groups
            .into_iter()
            .flat_map(|(path, by_source)| {
                by_source.into_iter().map(move |(source, totals)| PathBucket {
                    path: path.clone(),
                    source,
                    total_size: totals.total_size,
                    object_count: totals.object_count,
                    is_folder: totals.is_folder,
                })
            })
            .collect()
    }
}

impl Mergeable for PathBucketSet {
    fn merge(&mut self, other: Self) {
        for (path, by_source) in other.groups {
            for (source, totals) in by_source {
                self.add(&path, &source, totals);
            }
        }
    }

    fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }
}

/// Groups every object by its first `depth` key segments.
#[derive(Debug, Clone, Copy)]
pub struct PathDepthAggregator {
    depth: usize,
}

impl PathDepthAggregator {
    /// Fails when `depth` is below 1.
    pub fn new(depth: i64) -> Result<Self> {
        if depth < 1 {
            return Err(IxError::InvalidInput(format!(
                "Path depth must be at least 1, got {depth}"
            )));
        }
        let depth = usize::try_from(depth)
            .map_err(|_| IxError::InvalidInput(format!("Path depth {depth} is too large")))?;
        Ok(Self { depth })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Aggregator for PathDepthAggregator {
    type Partial = PathBucketSet;

    fn observe(&self, key: &str, size: u64, source: &str, partial: &mut PathBucketSet) {
        if let Some((path, is_folder)) = path_at_depth(key, self.depth) {
            partial.add(
                path,
                source,
                PathTotals {
                    total_size: size,
                    object_count: 1,
                    is_folder,
                },
            );
        }
    }

    fn name(&self) -> &'static str {
        "path_depth"
    }
}
