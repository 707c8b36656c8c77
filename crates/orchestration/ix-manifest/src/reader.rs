//! Manifest document parsing.

use ix_error::{ManifestError, ReaderError, Result};
use ix_traits::ObjectGateway;
use ix_types::{Manifest, PartFileDescriptor};
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tracing::debug;

#[derive(Deserialize)]
struct ManifestDocument {
    files: Vec<ManifestFile>,
}

#[derive(Deserialize)]
struct ManifestFile {
    key: String,
}

/// Provenance tag for everything listed by a manifest: the leading segment
/// of the manifest key.
pub fn source_tag(manifest_key: &str) -> &str {
    manifest_key.split('/').next().unwrap_or(manifest_key)
}

/// Parses a manifest body. Fields other than `files[].key` are ignored.
pub fn parse_manifest(bucket: &str, key: &str, body: &[u8]) -> Result<Manifest> {
    let document: ManifestDocument =
        serde_json::from_slice(body).map_err(|e| ManifestError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

    let source = source_tag(key);
    let files = document
        .files
        .into_iter()
        .map(|file| PartFileDescriptor::new(file.key).with_source(source))
        .collect();

    Ok(Manifest {
        bucket: bucket.to_string(),
        key: key.to_string(),
        files,
    })
}

/// Fetches and parses the manifest at `bucket`/`key`.
pub async fn read_manifest(gateway: &dyn ObjectGateway, bucket: &str, key: &str) -> Result<Manifest> {
    let mut body = gateway.get_object(bucket, key).await?;
    let mut bytes = Vec::new();
    body.read_to_end(&mut bytes)
        .await
        .map_err(|e| ReaderError::Io(format!("Failed to read manifest '{key}': {e}")))?;

    let manifest = parse_manifest(bucket, key, &bytes)?;
    debug!(
        bucket = bucket,
        key = key,
        part_files = manifest.part_count(),
        "Read manifest"
    );
    Ok(manifest)
}
