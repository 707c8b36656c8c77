//! Request layer operations.

use crate::api::{
    CachedManifest, ExportRequest, ExportResponse, FetchManifestsRequest, ManifestListing, PathSizeRequest,
    PathSizeResponse, SearchRequest, SearchResponse,
};
use crate::config::ServiceConfig;
use crate::export::{folders_to_csv, paths_to_csv};
use crate::store::{JsonFileCacheStore, JsonFileHistoryStore};
use chrono::Utc;
use ix_engine::InventoryEngine;
use ix_error::{IxError, Result};
use ix_traits::{BucketHistoryStore, ManifestCacheBatch, ManifestCacheStore};
use ix_types::ManifestCacheEntry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Message returned when no destination bucket holds any manifest.
pub const NO_MANIFESTS_MESSAGE: &str =
    "No manifests found. Please check if the buckets have S3 inventory configured.";

/// Stateful front of the query engine.
///
/// Owns the bucket history and manifest cache; the engine behind it only
/// sees parameters.
#[derive(Clone)]
pub struct InventoryService {
    engine: InventoryEngine,
    cache: Arc<dyn ManifestCacheStore>,
    history: Arc<dyn BucketHistoryStore>,
}

impl InventoryService {
    pub fn new(
        engine: InventoryEngine,
        cache: Arc<dyn ManifestCacheStore>,
        history: Arc<dyn BucketHistoryStore>,
    ) -> Self {
        Self {
            engine,
            cache,
            history,
        }
    }

    /// Service backed by JSON files under `config.state_dir`.
    pub fn with_json_stores(engine: InventoryEngine, config: &ServiceConfig) -> Self {
        Self::new(
            engine,
            Arc::new(JsonFileCacheStore::new(config.cache_path())),
            Arc::new(JsonFileHistoryStore::new(config.history_path())),
        )
    }

    /// Buckets queried before, oldest first.
    pub fn buckets(&self) -> Result<Vec<String>> {
        self.history.list()
    }

    /// Remembers bucket names; blank names are ignored.
    pub fn add_buckets(&self, names: &[String]) -> Result<Vec<String>> {
        let names: Vec<String> = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        self.history.add(&names)
    }

    /// Locates the latest manifest per source bucket, caches them and
    /// returns the cached manifests of every requested bucket.
    pub async fn fetch_manifests(&self, request: &FetchManifestsRequest) -> Result<ManifestListing> {
        let buckets = require_buckets(&request.bucket_names)?;

        let located = self.engine.locate_latest_manifests(&buckets).await?;
        if located.is_empty() {
            return Err(IxError::NotFound(NO_MANIFESTS_MESSAGE.to_string()));
        }

        let now = Utc::now();
        let mut batch = ManifestCacheBatch::new();
        for (source, manifests) in &located {
            for manifest in manifests {
                batch
                    .entry(manifest.destination_bucket.clone())
                    .or_default()
                    .insert(source.clone(), ManifestCacheEntry::new(&manifest.key, now));
            }
        }
        self.cache.put_all(batch)?;

        info!(
            buckets = buckets.len(),
            sources = located.len(),
            "Cached latest manifests"
        );

        self.listing(&buckets)
    }

    /// Cached manifests of each bucket, without touching the gateway.
    ///
    /// A bucket with nothing cached maps to an empty list.
    pub fn cached_manifests(&self, bucket_names: &[String]) -> Result<ManifestListing> {
        let buckets = require_buckets(bucket_names)?;
        self.listing(&buckets)
    }

    /// Forgets every cached manifest.
    pub fn clear_cache(&self) -> Result<()> {
        info!("Clearing manifest cache");
        self.cache.clear()
    }

    pub async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse> {
        let report = self
            .engine
            .search(
                &request.bucket_name,
                &request.manifest_keys,
                &request.search_string,
                cancel,
            )
            .await?;
        self.mark_used(&request.bucket_name, &request.manifest_keys);
        Ok(SearchResponse::from(report))
    }

    pub async fn path_size(
        &self,
        request: &PathSizeRequest,
        cancel: &CancellationToken,
    ) -> Result<PathSizeResponse> {
        let report = self
            .engine
            .path_size(
                &request.bucket_name,
                &request.manifest_keys,
                request.path_depth,
                cancel,
            )
            .await?;
        self.mark_used(&request.bucket_name, &request.manifest_keys);
        Ok(report)
    }

    /// Re-runs the requested query and renders its results as CSV.
    ///
    /// Part-file failures do not fail the export; they come back on the
    /// response next to the rows that were read.
    pub async fn export_csv(
        &self,
        request: &ExportRequest,
        cancel: &CancellationToken,
    ) -> Result<ExportResponse> {
        let (csv, failed_parts, stats) = match request {
            ExportRequest::Search(search) => {
                let report = self.search(search, cancel).await?.report;
                (folders_to_csv(&report.results)?, report.failed_parts, report.stats)
            }
            ExportRequest::PathSize(paths) => {
                let report = self.path_size(paths, cancel).await?;
                (paths_to_csv(&report.results)?, report.failed_parts, report.stats)
            }
        };

        if !failed_parts.is_empty() {
            warn!(
                failed = failed_parts.len(),
                parts = stats.parts_total,
                "Export is missing rows from failed part-files"
            );
        }

        Ok(ExportResponse {
            file_name: request.file_name(),
            csv,
            failed_parts,
            stats,
        })
    }

    fn listing(&self, buckets: &[String]) -> Result<ManifestListing> {
        let mut listing = ManifestListing::new();
        for bucket in buckets {
            let entries = self
                .cache
                .get(bucket)?
                .into_iter()
                .map(|(source, entry)| CachedManifest {
                    added_date: entry.added_date_display(),
                    key: entry.key,
                    source_bucket: source,
                })
                .collect();
            listing.insert(bucket.clone(), entries);
        }
        Ok(listing)
    }

    /// Stamps `last_used` on the cache entries behind a finished query.
    fn mark_used(&self, bucket: &str, manifest_keys: &[String]) {
        match self.cache.touch(bucket, manifest_keys, Utc::now()) {
            Ok(touched) => debug!(bucket = bucket, touched = touched, "Updated manifest usage"),
            Err(e) => warn!(bucket = bucket, error = %e, "Failed to update manifest usage"),
        }
    }
}

/// Trimmed, non-blank bucket names; at least one is required.
fn require_buckets(names: &[String]) -> Result<Vec<String>> {
    let buckets: Vec<String> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();
    if buckets.is_empty() {
        return Err(IxError::InvalidInput(
            "At least one bucket name is required".to_string(),
        ));
    }
    Ok(buckets)
}
