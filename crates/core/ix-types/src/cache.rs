//! Manifest cache entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remembered manifest for one (destination bucket, source bucket) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCacheEntry {
    /// Manifest key in the destination bucket
    pub key: String,

    /// When the manifest was first fetched into the cache
    pub added_date: DateTime<Utc>,

    /// When a query last referenced the manifest
    pub last_used: DateTime<Utc>,
}

impl ManifestCacheEntry {
    /// Creates an entry stamped with `now` for both timestamps.
    pub fn new(key: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            added_date: now,
            last_used: now,
        }
    }

    /// `added_date` rendered as `YYYY-MM-DD HH:MM:SS`.
    pub fn added_date_display(&self) -> String {
        self.added_date.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_added_date_display_drops_fraction() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
            + chrono::Duration::milliseconds(250);
        let entry = ManifestCacheEntry::new("inv/src/cfg/manifest.json", now);
        assert_eq!(entry.added_date_display(), "2024-03-09 14:05:07");
        assert_eq!(entry.added_date, entry.last_used);
    }
}
