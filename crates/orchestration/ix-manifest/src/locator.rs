//! Latest-manifest discovery.

use ix_error::Result;
use ix_traits::ObjectGateway;
use ix_types::{LocatedManifest, MANIFEST_FILE_NAME, ObjectEntry};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Source bucket named by a manifest key: its third-from-last segment.
///
/// Inventory exports store manifests as
/// `.../<source-bucket>/<inventory-id>/manifest.json`. Returns `None` for keys
/// with fewer than three segments or an empty source segment.
pub fn source_bucket_of(key: &str) -> Option<&str> {
    let segments: Vec<&str> = key.split('/').collect();
    if segments.len() < 3 {
        return None;
    }
    let source = segments[segments.len() - 3];
    (!source.is_empty()).then_some(source)
}

/// Finds the newest manifest per source bucket across `destination_buckets`.
///
/// Each destination is listed in full; keys whose final segment is
/// `manifest.json` are grouped by source bucket and the one with the greatest
/// modification time is kept. Equal timestamps keep the first candidate in
/// listing order. The result maps each source bucket to one manifest per
/// destination bucket that carries inventory for it.
///
/// A destination without manifests contributes nothing. Listing failures
/// (missing bucket, access denied, bad credentials) abort the whole call.
pub async fn locate_latest_manifests(
    gateway: &dyn ObjectGateway,
    destination_buckets: &[String],
) -> Result<BTreeMap<String, Vec<LocatedManifest>>> {
    let mut located: BTreeMap<String, Vec<LocatedManifest>> = BTreeMap::new();
    let mut seen = HashSet::new();

    for bucket in destination_buckets {
        if !seen.insert(bucket.as_str()) {
            continue;
        }

        let objects = gateway.list_objects(bucket, None).await?;
        let latest = latest_per_source(bucket, &objects);

        debug!(
            gateway = gateway.name(),
            bucket = %bucket,
            objects = objects.len(),
            sources = latest.len(),
            "Scanned destination bucket for manifests"
        );

        for (source, manifest) in latest {
            located.entry(source).or_default().push(manifest);
        }
    }

    info!(
        destinations = seen.len(),
        sources = located.len(),
        "Located latest inventory manifests"
    );

    Ok(located)
}

fn latest_per_source(bucket: &str, objects: &[ObjectEntry]) -> BTreeMap<String, LocatedManifest> {
    let mut latest: BTreeMap<String, LocatedManifest> = BTreeMap::new();

    for object in objects {
        if object.file_name() != MANIFEST_FILE_NAME {
            continue;
        }
        let Some(source) = source_bucket_of(&object.key) else {
            continue;
        };

        let candidate = LocatedManifest {
            destination_bucket: bucket.to_string(),
            source_bucket: source.to_string(),
            key: object.key.clone(),
            last_modified: object.last_modified,
        };

        match latest.get_mut(source) {
            // Strictly newer only, so the first of equal timestamps stays
            Some(current) if candidate.last_modified > current.last_modified => {
                *current = candidate;
            }
            Some(_) => {}
            None => {
                latest.insert(source.to_string(), candidate);
            }
        }
    }

    latest
}
