//! Query engine: manifest expansion plus fan-out per query kind.

use crate::config::EngineConfig;
use crate::fanout::{FanOut, PartTask};
use ix_aggregate::{PathDepthAggregator, SearchAggregator};
use ix_error::{IxError, Result};
use ix_manifest::{locate_latest_manifests, read_manifest};
use ix_traits::ObjectGateway;
use ix_types::{LocatedManifest, PathSizeReport, SearchReport};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Runs inventory queries against one gateway.
///
/// Stateless apart from the shared gateway: every input arrives as a
/// parameter and nothing is remembered between calls.
#[derive(Clone)]
pub struct InventoryEngine {
    gateway: Arc<dyn ObjectGateway>,
    fan_out: FanOut,
}

impl InventoryEngine {
    pub fn new(gateway: Arc<dyn ObjectGateway>, config: EngineConfig) -> Self {
        Self {
            fan_out: FanOut::new(Arc::clone(&gateway), config),
            gateway,
        }
    }

    /// Newest manifest per source bucket across `destination_buckets`.
    pub async fn locate_latest_manifests(
        &self,
        destination_buckets: &[String],
    ) -> Result<BTreeMap<String, Vec<LocatedManifest>>> {
        if destination_buckets.is_empty() {
            return Err(IxError::InvalidInput(
                "At least one bucket name is required".to_string(),
            ));
        }
        locate_latest_manifests(self.gateway.as_ref(), destination_buckets).await
    }

    /// Folder-grouped search for `needle` over every part-file of
    /// `manifest_keys` in `bucket`.
    pub async fn search(
        &self,
        bucket: &str,
        manifest_keys: &[String],
        needle: &str,
        cancel: &CancellationToken,
    ) -> Result<SearchReport> {
        validate_target(bucket, manifest_keys)?;
        let aggregator = Arc::new(SearchAggregator::new(needle)?);

        let tasks = self.expand_manifests(bucket, manifest_keys, cancel).await?;
        let report = self.fan_out.run(aggregator, tasks, cancel).await?;

        let mut search = SearchReport::new(report.merged.into_results(bucket));
        search.failed_parts = report.failures;
        search.stats = report.stats;

        info!(
            bucket = bucket,
            needle = needle,
            folders = search.total_folders,
            total_size = search.total_size,
            complete = search.stats.is_complete(),
            "Search complete"
        );

        Ok(search)
    }

    /// Size and count per path prefix of `depth` segments over every
    /// part-file of `manifest_keys` in `bucket`.
    ///
    /// `depth` below 1 is rejected before the gateway is touched.
    pub async fn path_size(
        &self,
        bucket: &str,
        manifest_keys: &[String],
        depth: i64,
        cancel: &CancellationToken,
    ) -> Result<PathSizeReport> {
        let aggregator = Arc::new(PathDepthAggregator::new(depth)?);
        validate_target(bucket, manifest_keys)?;

        let tasks = self.expand_manifests(bucket, manifest_keys, cancel).await?;
        let report = self.fan_out.run(aggregator, tasks, cancel).await?;

        let mut paths = PathSizeReport::new(report.merged.into_results());
        paths.failed_parts = report.failures;
        paths.stats = report.stats;

        info!(
            bucket = bucket,
            depth = depth,
            paths = paths.total_paths,
            total_size = paths.total_size,
            complete = paths.stats.is_complete(),
            "Path-size aggregation complete"
        );

        Ok(paths)
    }

    /// Reads each distinct manifest and lists its part-files as tasks.
    ///
    /// Any manifest failure aborts the query.
    async fn expand_manifests(
        &self,
        bucket: &str,
        manifest_keys: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<PartTask>> {
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();

        for key in manifest_keys {
            if !seen.insert(key.as_str()) {
                continue;
            }
            if cancel.is_cancelled() {
                return Err(IxError::Cancelled);
            }

            let manifest = read_manifest(self.gateway.as_ref(), bucket, key).await?;
            tasks.extend(
                manifest
                    .files
                    .into_iter()
                    .map(|part| PartTask::new(bucket, part)),
            );
        }

        Ok(tasks)
    }
}

fn validate_target(bucket: &str, manifest_keys: &[String]) -> Result<()> {
    if bucket.is_empty() {
        return Err(IxError::InvalidInput("Bucket name is required".to_string()));
    }
    if manifest_keys.is_empty() {
        return Err(IxError::InvalidInput(
            "At least one manifest key is required".to_string(),
        ));
    }
    if manifest_keys.iter().any(|k| k.is_empty()) {
        return Err(IxError::InvalidInput(
            "Manifest keys must not be empty".to_string(),
        ));
    }
    Ok(())
}
