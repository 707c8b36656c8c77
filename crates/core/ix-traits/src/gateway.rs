//! Object store gateway trait.

use async_trait::async_trait;
use ix_error::Result;
use ix_types::ObjectEntry;
use std::pin::Pin;
use tokio::io::AsyncBufRead;

/// Buffered byte stream of one object's body.
pub type ObjectBody = Pin<Box<dyn AsyncBufRead + Send>>;

/// Read-only access to an object store.
///
/// The gateway is shared by every concurrent part-file task, so
/// implementations must not hold per-call mutable state.
///
/// # Implementations
///
/// - S3 gateway: `ListObjectsV2` with pagination, `GetObject` streaming
/// - Local gateway: directories under a root stand in for buckets
///
/// # Errors
///
/// Failures are returned as classified `GatewayError`s (missing bucket,
/// access denied, bad credentials, ...) so callers can map them to a
/// user-facing category without inspecting error text.
#[async_trait]
pub trait ObjectGateway: Send + Sync {
    /// Lists every object in `bucket` whose key starts with `prefix`.
    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<ObjectEntry>>;

    /// Opens an object for streaming.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody>;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;
}
