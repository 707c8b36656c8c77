//! ix-aggregate - per-chunk aggregation with mergeable partials.
//!
//! An [`Aggregator`] folds inventory rows into a [`Mergeable`] partial. Each
//! part-file task owns its partial; the fan-out controller merges them once
//! every task has finished. Merging is associative and commutative, so the
//! final numbers do not depend on chunking or completion order.
//!
//! - [`SearchAggregator`] groups keys containing a search string by the
//!   folder where the string first appears
//! - [`PathDepthAggregator`] groups every key by its first `depth` segments

mod depth;
mod search;

pub use depth::{PathBucketSet, PathDepthAggregator, PathTotals, path_at_depth};
pub use search::{FolderMatchSet, FolderTotals, SearchAggregator, folder_path_for};

use ix_reader_csv::InventoryChunk;

/// A partial aggregate that can absorb another of its kind.
pub trait Mergeable: Default {
    /// Folds `other` into `self`.
    fn merge(&mut self, other: Self);

    /// Number of groups held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Folds inventory rows into a partial aggregate.
pub trait Aggregator: Send + Sync + 'static {
    type Partial: Mergeable + Send + 'static;

    /// Accounts for one object.
    fn observe(&self, key: &str, size: u64, source: &str, partial: &mut Self::Partial);

    /// Accounts for every keyed row of a chunk.
    fn aggregate_chunk(&self, chunk: &InventoryChunk, source: &str, partial: &mut Self::Partial) {
        for row in chunk.rows() {
            self.observe(row.key, row.size, source, partial);
        }
    }

    /// Short name used in log lines.
    fn name(&self) -> &'static str;
}
