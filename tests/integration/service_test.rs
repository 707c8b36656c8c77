//! Request layer over the local gateway with JSON state files.

use crate::common::InventoryFixture;
use ix_engine::{EngineConfig, InventoryEngine};
use ix_error::classify_error;
use ix_gateway::LocalGateway;
use ix_service::{
    ErrorResponse, ExportRequest, FetchManifestsRequest, InventoryService, NO_MANIFESTS_MESSAGE,
    PathSizeRequest, SearchRequest, ServiceConfig,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

struct Harness {
    fixture: InventoryFixture,
    state: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            fixture: InventoryFixture::new(),
            state: tempfile::tempdir().unwrap(),
        }
    }

    fn config(&self) -> ServiceConfig {
        ServiceConfig::new().with_state_dir(self.state.path())
    }

    fn service(&self) -> InventoryService {
        let gateway = LocalGateway::new(self.fixture.root()).unwrap();
        let engine = InventoryEngine::new(Arc::new(gateway), EngineConfig::default());
        InventoryService::with_json_stores(engine, &self.config())
    }
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn test_fetch_then_query_then_export() {
    let harness = Harness::new();
    let manifest = harness.fixture.export(
        "dest",
        "inv",
        "app",
        "run",
        &[&[("2024/logs/a.txt", 10), ("2024/logs/b.txt", 20), ("2024/img/c.png", 5)]],
        0,
    );
    harness.fixture.bucket("other");

    let service = harness.service();
    let listing = service
        .fetch_manifests(&FetchManifestsRequest {
            bucket_names: names(&["dest", "other"]),
        })
        .await
        .unwrap();
    assert_eq!(listing["dest"].len(), 1);
    assert_eq!(listing["dest"][0].key, manifest);
    assert_eq!(listing["dest"][0].source_bucket, "app");
    assert!(listing["other"].is_empty());

    // Cache file uses the nested destination → source layout
    let cache: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(harness.config().cache_path()).unwrap(),
    )
    .unwrap();
    assert_eq!(cache["dest"]["app"]["key"], manifest.as_str());

    let cancel = CancellationToken::new();
    let search = SearchRequest {
        bucket_name: "dest".to_string(),
        manifest_keys: vec![manifest.clone()],
        search_string: "LOGS".to_string(),
    };
    let response = service.search(&search, &cancel).await.unwrap();
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["type"], "folders");
    assert_eq!(json["total_folders"], 1);
    assert_eq!(json["total_size"], 30);
    assert_eq!(json["results"][0]["folder_path"], "2024/logs");
    assert_eq!(json["results"][0]["bucket"], "dest");

    let paths = service
        .path_size(
            &PathSizeRequest {
                bucket_name: "dest".to_string(),
                manifest_keys: vec![manifest.clone()],
                path_depth: 1,
            },
            &cancel,
        )
        .await
        .unwrap();
    let json = serde_json::to_value(&paths).unwrap();
    assert_eq!(json["total_paths"], 1);
    assert_eq!(json["total_size"], 35);
    assert_eq!(json["results"][0]["is_folder"], true);

    let export = service
        .export_csv(&ExportRequest::Search(search), &cancel)
        .await
        .unwrap();
    assert!(export.is_complete());
    assert_eq!(
        export.csv,
        "folder_path,source,total_size,file_count,bucket\n2024/logs,inv,30,2,dest\n"
    );
}

#[tokio::test]
async fn test_export_over_corrupt_part_reports_failure() {
    let harness = Harness::new();
    let manifest = harness.fixture.export(
        "dest",
        "inv",
        "app",
        "run",
        &[&[("a/b/one", 10)], &[("a/b/two", 20)]],
        0,
    );
    harness
        .fixture
        .put("dest", "inv/app/run/data/part-1.csv.gz", b"\x1f\x8b truncated");

    let export = harness
        .service()
        .export_csv(
            &ExportRequest::PathSize(PathSizeRequest {
                bucket_name: "dest".to_string(),
                manifest_keys: vec![manifest],
                path_depth: 2,
            }),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!export.is_complete());
    assert_eq!(export.failed_parts.len(), 1);
    assert_eq!(export.failed_parts[0].key, "inv/app/run/data/part-1.csv.gz");
    assert_eq!(export.stats.parts_failed, 1);
    assert_eq!(
        export.csv,
        "path,source,total_size,object_count,is_folder\na/b,inv,10,1,true\n"
    );
}

#[tokio::test]
async fn test_state_survives_restart() {
    let harness = Harness::new();
    harness
        .fixture
        .export("dest", "inv", "app", "run", &[&[("a/b", 1)]], 0);

    harness
        .service()
        .fetch_manifests(&FetchManifestsRequest {
            bucket_names: names(&["dest"]),
        })
        .await
        .unwrap();
    harness.service().add_buckets(&names(&["dest"])).unwrap();

    let service = harness.service();
    assert_eq!(service.buckets().unwrap(), names(&["dest"]));
    let listing = service.cached_manifests(&names(&["dest"])).unwrap();
    assert_eq!(listing["dest"].len(), 1);

    service.clear_cache().unwrap();
    assert!(
        harness.service().cached_manifests(&names(&["dest"])).unwrap()["dest"].is_empty()
    );
    assert_eq!(harness.service().buckets().unwrap(), names(&["dest"]));
}

#[tokio::test]
async fn test_no_manifests_found() {
    let harness = Harness::new();
    harness.fixture.bucket("empty");
    harness
        .fixture
        .put("empty", "unrelated/object.txt", b"hello");

    let err = harness
        .service()
        .fetch_manifests(&FetchManifestsRequest {
            bucket_names: names(&["empty"]),
        })
        .await
        .unwrap_err();

    let response = ErrorResponse::from(&err);
    assert_eq!(response.status, 404);
    assert_eq!(response.error, format!("Not found: {NO_MANIFESTS_MESSAGE}"));
}

#[tokio::test]
async fn test_missing_bucket_is_not_found() {
    let harness = Harness::new();

    let err = harness
        .service()
        .fetch_manifests(&FetchManifestsRequest {
            bucket_names: names(&["nowhere"]),
        })
        .await
        .unwrap_err();

    assert_eq!(classify_error(&err).status_code(), 404);
    assert_eq!(
        ErrorResponse::from(&err).error,
        "Bucket nowhere does not exist. Please check the bucket name."
    );
}

#[tokio::test]
async fn test_invalid_depth_never_reaches_store() {
    let harness = Harness::new();

    let err = harness
        .service()
        .path_size(
            &PathSizeRequest {
                bucket_name: "nowhere".to_string(),
                manifest_keys: names(&["inv/x/y/manifest.json"]),
                path_depth: -2,
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    // A store lookup would have failed with NoSuchBucket instead
    assert_eq!(classify_error(&err).status_code(), 400);
}
