//! Cache and history stores.
//!
//! The JSON file stores read the whole document, modify it and write it back
//! on every update. A mutex serialises updates inside one process; two
//! processes sharing a state directory can still overwrite each other's
//! changes, last writer wins.

use chrono::{DateTime, Utc};
use ix_error::{Result, StoreError};
use ix_traits::{BucketHistoryStore, ManifestCacheBatch, ManifestCacheStore};
use ix_types::ManifestCacheEntry;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// destination bucket → source bucket → entry
type CacheDocument = ManifestCacheBatch;

fn merge_batch(document: &mut CacheDocument, batch: ManifestCacheBatch) -> usize {
    let mut stored = 0;
    for (destination, by_source) in batch {
        stored += by_source.len();
        document.entry(destination).or_default().extend(by_source);
    }
    stored
}

fn touch_entries(
    document: &mut CacheDocument,
    destination: &str,
    keys: &[String],
    now: DateTime<Utc>,
) -> usize {
    let Some(by_source) = document.get_mut(destination) else {
        return 0;
    };

    let mut touched = 0;
    for entry in by_source.values_mut() {
        if keys.iter().any(|k| *k == entry.key) {
            entry.last_used = now;
            touched += 1;
        }
    }
    touched
}

fn append_unique(list: &mut Vec<String>, names: &[String]) -> usize {
    let before = list.len();
    for name in names {
        if !list.contains(name) {
            list.push(name.clone());
        }
    }
    list.len() - before
}

fn load_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(StoreError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into());
        }
    };

    if text.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&text).map_err(|e| {
        StoreError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let io_error = |e: io::Error| StoreError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let text = serde_json::to_string_pretty(value).map_err(|e| StoreError::Corrupt {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    fs::write(path, text).map_err(io_error)?;

    trace!(path = %path.display(), "Wrote state file");
    Ok(())
}

/// Manifest cache persisted as a pretty-printed JSON document.
pub struct JsonFileCacheStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<R>(&self, f: impl FnOnce(&mut CacheDocument) -> R) -> Result<R> {
        let _guard = self.lock.lock();
        let mut document: CacheDocument = load_json(&self.path)?;
        let result = f(&mut document);
        save_json(&self.path, &document)?;
        Ok(result)
    }
}

impl ManifestCacheStore for JsonFileCacheStore {
    fn get(&self, destination: &str) -> Result<BTreeMap<String, ManifestCacheEntry>> {
        let _guard = self.lock.lock();
        let mut document: CacheDocument = load_json(&self.path)?;
        Ok(document.remove(destination).unwrap_or_default())
    }

    fn put_all(&self, batch: ManifestCacheBatch) -> Result<()> {
        let destinations = batch.len();
        let stored = self.update(|document| merge_batch(document, batch))?;
        debug!(
            path = %self.path.display(),
            destinations = destinations,
            entries = stored,
            "Cached manifests"
        );
        Ok(())
    }

    fn touch(&self, destination: &str, keys: &[String], now: DateTime<Utc>) -> Result<usize> {
        self.update(|document| touch_entries(document, destination, keys, now))
    }

    fn clear(&self) -> Result<()> {
        debug!(path = %self.path.display(), "Clearing manifest cache");
        let _guard = self.lock.lock();
        save_json(&self.path, &CacheDocument::new())
    }
}

/// Manifest cache held in memory.
#[derive(Default)]
pub struct MemoryCacheStore {
    document: Mutex<CacheDocument>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ManifestCacheStore for MemoryCacheStore {
    fn get(&self, destination: &str) -> Result<BTreeMap<String, ManifestCacheEntry>> {
        Ok(self
            .document
            .lock()
            .get(destination)
            .cloned()
            .unwrap_or_default())
    }

    fn put_all(&self, batch: ManifestCacheBatch) -> Result<()> {
        merge_batch(&mut self.document.lock(), batch);
        Ok(())
    }

    fn touch(&self, destination: &str, keys: &[String], now: DateTime<Utc>) -> Result<usize> {
        Ok(touch_entries(
            &mut self.document.lock(),
            destination,
            keys,
            now,
        ))
    }

    fn clear(&self) -> Result<()> {
        self.document.lock().clear();
        Ok(())
    }
}

/// Bucket history persisted as a JSON array.
pub struct JsonFileHistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BucketHistoryStore for JsonFileHistoryStore {
    fn list(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock();
        load_json(&self.path)
    }

    fn add(&self, names: &[String]) -> Result<Vec<String>> {
        let _guard = self.lock.lock();
        let mut buckets: Vec<String> = load_json(&self.path)?;
        if append_unique(&mut buckets, names) > 0 {
            save_json(&self.path, &buckets)?;
        }
        Ok(buckets)
    }
}

/// Bucket history held in memory.
#[derive(Default)]
pub struct MemoryHistoryStore {
    buckets: Mutex<Vec<String>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BucketHistoryStore for MemoryHistoryStore {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.buckets.lock().clone())
    }

    fn add(&self, names: &[String]) -> Result<Vec<String>> {
        let mut buckets = self.buckets.lock();
        append_unique(&mut buckets, names);
        Ok(buckets.clone())
    }
}
