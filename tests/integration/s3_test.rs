//! S3 gateway tests against LocalStack.

use crate::common::{LocalStackTestContext, gzip_inventory, manifest_document};
use ix_engine::{EngineConfig, InventoryEngine};
use ix_error::{GatewayError, IxError};
use ix_gateway::{S3Config, S3Gateway};
use ix_traits::ObjectGateway;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

async fn gateway(ctx: &LocalStackTestContext) -> S3Gateway {
    let config = S3Config::new()
        .with_endpoint(&ctx.endpoint)
        .with_region(&ctx.region)
        .with_credentials("test", "test", None);
    S3Gateway::connect(&config).await.unwrap()
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_s3_search_end_to_end() {
    let ctx = LocalStackTestContext::new().await;
    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "invex-inventory-dest";
    ctx.create_bucket(bucket).await.unwrap();

    let part = "inv/src-bucket/daily/data/part-0.csv.gz".to_string();
    ctx.put_object(
        bucket,
        &part,
        gzip_inventory("src-bucket", &[("2024/logs/a.txt", 10), ("2024/img/b.png", 20)]),
    )
    .await
    .unwrap();
    ctx.put_object(
        bucket,
        "inv/src-bucket/daily/manifest.json",
        manifest_document("src-bucket", &[part]),
    )
    .await
    .unwrap();

    let engine = InventoryEngine::new(Arc::new(gateway(&ctx).await), EngineConfig::default());

    let located = engine
        .locate_latest_manifests(&[bucket.to_string()])
        .await
        .unwrap();
    let manifest = &located["src-bucket"][0];
    assert_eq!(manifest.key, "inv/src-bucket/daily/manifest.json");

    let report = engine
        .search(bucket, &[manifest.key.clone()], "logs", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.total_folders, 1);
    assert_eq!(report.results[0].folder_path, "2024/logs");
    assert_eq!(report.total_size, 10);
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_s3_missing_bucket_is_classified() {
    let ctx = LocalStackTestContext::new().await;
    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let err = gateway(&ctx)
        .await
        .list_objects("invex-no-such-bucket", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IxError::Gateway(GatewayError::NoSuchBucket(_))
    ));
}
