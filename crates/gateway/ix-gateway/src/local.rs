//! Filesystem gateway: every top-level directory under a root is a bucket.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use ix_error::{GatewayError, IxError, Result};
use ix_traits::{ObjectBody, ObjectGateway};
use ix_types::ObjectEntry;
use object_store::ObjectStore;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_util::io::StreamReader;
use tracing::debug;

/// Object gateway over a local directory tree.
///
/// `root/<bucket>/<key>` holds the object `<key>` of `<bucket>`. Used for
/// offline runs against a downloaded inventory and in tests.
#[derive(Clone)]
pub struct LocalGateway {
    root: PathBuf,
    store: Arc<LocalFileSystem>,
}

impl LocalGateway {
    /// Opens a gateway rooted at `root`, which must exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let store = LocalFileSystem::new_with_prefix(&root).map_err(|e| {
            GatewayError::Io(format!("Invalid local root '{}': {}", root.display(), e))
        })?;

        Ok(Self {
            root,
            store: Arc::new(store),
        })
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        if bucket.is_empty() || bucket.contains('/') {
            return Err(GatewayError::NoSuchBucket(bucket.to_string()).into());
        }

        match tokio::fs::metadata(self.root.join(bucket)).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(GatewayError::NoSuchBucket(bucket.to_string()).into()),
        }
    }
}

#[async_trait]
impl ObjectGateway for LocalGateway {
    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<ObjectEntry>> {
        self.ensure_bucket(bucket).await?;

        let bucket_path = ObjectPath::from(bucket);
        let bucket_prefix = format!("{}/", bucket_path.as_ref());
        let prefix = prefix.unwrap_or("");

        let metas: Vec<_> = self
            .store
            .list(Some(&bucket_path))
            .try_collect()
            .await
            .map_err(|e| map_store_error(e, bucket))?;

        // Prefix filtering is plain string matching, as with S3
        let mut objects: Vec<ObjectEntry> = metas
            .into_iter()
            .filter_map(|meta| {
                let key = meta.location.as_ref().strip_prefix(&bucket_prefix)?.to_string();
                key.starts_with(prefix).then(|| {
                    ObjectEntry::new(key, meta.size as u64, Some(meta.last_modified))
                })
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        debug!(
            bucket = bucket,
            prefix = prefix,
            object_count = objects.len(),
            "Listed local bucket"
        );

        Ok(objects)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        self.ensure_bucket(bucket).await?;

        let path = ObjectPath::from(format!("{bucket}/{key}"));
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| map_store_error(e, &format!("{bucket}/{key}")))?;

        let bytes_stream = result
            .into_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other));

        Ok(Box::pin(BufReader::with_capacity(
            8192,
            StreamReader::new(bytes_stream),
        )))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

fn map_store_error(error: object_store::Error, target: &str) -> IxError {
    match error {
        object_store::Error::NotFound { .. } => GatewayError::NotFound(target.to_string()).into(),
        other => GatewayError::Io(format!("{target}: {other}")).into(),
    }
}
