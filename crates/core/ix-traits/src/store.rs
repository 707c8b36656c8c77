//! Persistence traits for the request layer.
//!
//! The aggregation core is stateless; only the request layer remembers
//! buckets and manifests, through these traits.

use chrono::{DateTime, Utc};
use ix_error::Result;
use ix_types::ManifestCacheEntry;
use std::collections::BTreeMap;

/// Cache entries keyed by destination bucket, then source bucket.
pub type ManifestCacheBatch = BTreeMap<String, BTreeMap<String, ManifestCacheEntry>>;

/// Remembered manifests keyed by destination bucket, then source bucket.
///
/// A destination bucket maps to at most one manifest per source bucket;
/// `put_all` overwrites. Entries never expire on their own.
pub trait ManifestCacheStore: Send + Sync {
    /// Entries for one destination bucket, keyed by source bucket.
    fn get(&self, destination: &str) -> Result<BTreeMap<String, ManifestCacheEntry>>;

    /// Stores or replaces every `(destination, source)` entry of `batch` in
    /// a single update. Entries not named in `batch` are left alone.
    fn put_all(&self, batch: ManifestCacheBatch) -> Result<()>;

    /// Sets `last_used` on every entry of `destination` whose key is in `keys`.
    ///
    /// Returns the number of entries touched.
    fn touch(&self, destination: &str, keys: &[String], now: DateTime<Utc>) -> Result<usize>;

    /// Removes every entry.
    fn clear(&self) -> Result<()>;
}

/// Ordered set of bucket names queried before.
pub trait BucketHistoryStore: Send + Sync {
    /// All remembered bucket names, oldest first.
    fn list(&self) -> Result<Vec<String>>;

    /// Appends names not already present; returns the updated list.
    fn add(&self, names: &[String]) -> Result<Vec<String>>;
}
