//! Common utilities for integration tests.
//!
//! [`InventoryFixture`] lays out inventory exports under a temporary
//! directory in the shape the local gateway serves: `root/<bucket>/<key>`.

pub mod localstack;

pub use localstack::LocalStackTestContext;

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// One inventory row: key and size.
pub type Row<'a> = (&'a str, u64);

/// Gzip-compressed, headerless inventory CSV.
pub fn gzip_inventory(bucket: &str, rows: &[Row<'_>]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    for (key, size) in rows {
        writeln!(
            encoder,
            "\"{bucket}\",\"{key}\",\"{size}\",\"2024-05-01T00:00:00.000Z\",\"STANDARD\""
        )
        .unwrap();
    }
    encoder.finish().unwrap()
}

/// Manifest document listing `part_keys`.
pub fn manifest_document(source_bucket: &str, part_keys: &[String]) -> Vec<u8> {
    let files: Vec<_> = part_keys
        .iter()
        .map(|key| serde_json::json!({ "key": key, "size": 1, "MD5checksum": "0" }))
        .collect();
    serde_json::to_vec_pretty(&serde_json::json!({
        "sourceBucket": source_bucket,
        "destinationBucket": "arn:aws:s3:::dest",
        "fileFormat": "CSV",
        "files": files,
    }))
    .unwrap()
}

/// Temporary directory of buckets holding inventory exports.
pub struct InventoryFixture {
    dir: TempDir,
}

impl InventoryFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Creates an empty bucket directory.
    pub fn bucket(&self, bucket: &str) -> &Self {
        fs::create_dir_all(self.root().join(bucket)).unwrap();
        self
    }

    /// Writes one object, creating parent directories.
    pub fn put(&self, bucket: &str, key: &str, body: &[u8]) -> PathBuf {
        let path = self.root().join(bucket).join(key);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    /// Writes an inventory export: one manifest plus one gzip part per entry
    /// of `parts`, with the manifest's modification time set `age_secs` in
    /// the past. Returns the manifest key.
    pub fn export(
        &self,
        bucket: &str,
        prefix: &str,
        source: &str,
        run: &str,
        parts: &[&[Row<'_>]],
        age_secs: u64,
    ) -> String {
        let base = format!("{prefix}/{source}/{run}");
        let part_keys: Vec<String> = (0..parts.len())
            .map(|i| format!("{base}/data/part-{i}.csv.gz"))
            .collect();

        for (key, rows) in part_keys.iter().zip(parts) {
            self.put(bucket, key, &gzip_inventory(source, rows));
        }

        let manifest_key = format!("{base}/manifest.json");
        let path = self.put(bucket, &manifest_key, &manifest_document(source, &part_keys));
        set_age(&path, age_secs);
        manifest_key
    }
}

fn set_age(path: &Path, age_secs: u64) {
    let modified = SystemTime::now() - Duration::from_secs(age_secs);
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
}
