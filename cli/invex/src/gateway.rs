//! S3 gateway that connects on first use.

use async_trait::async_trait;
use ix_error::Result;
use ix_gateway::{S3Config, S3Gateway};
use ix_traits::{ObjectBody, ObjectGateway};
use ix_types::ObjectEntry;
use tokio::sync::OnceCell;

/// Defers building the S3 client, and so resolving credentials, until a
/// command actually reads from S3. Commands that only touch local state
/// work on machines without AWS credentials.
pub struct DeferredS3Gateway {
    config: S3Config,
    gateway: OnceCell<S3Gateway>,
}

impl DeferredS3Gateway {
    pub fn new(config: S3Config) -> Self {
        Self {
            config,
            gateway: OnceCell::new(),
        }
    }

    async fn gateway(&self) -> Result<&S3Gateway> {
        self.gateway
            .get_or_try_init(|| S3Gateway::connect(&self.config))
            .await
    }
}

#[async_trait]
impl ObjectGateway for DeferredS3Gateway {
    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<ObjectEntry>> {
        self.gateway().await?.list_objects(bucket, prefix).await
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        self.gateway().await?.get_object(bucket, key).await
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}
