//! Locate → read manifest → fan-out → merge, over the local gateway.

use crate::common::{InventoryFixture, gzip_inventory};
use ix_engine::{EngineConfig, InventoryEngine};
use ix_error::{GatewayError, IxError};
use ix_gateway::LocalGateway;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn engine(fixture: &InventoryFixture, config: EngineConfig) -> InventoryEngine {
    InventoryEngine::new(Arc::new(LocalGateway::new(fixture.root()).unwrap()), config)
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn test_latest_manifest_per_source() {
    let fixture = InventoryFixture::new();
    fixture.export("dest", "inv", "photos", "2024-04-01T00-00Z", &[&[("a", 1)]], 7200);
    let newest =
        fixture.export("dest", "inv", "photos", "2024-05-01T00-00Z", &[&[("a", 1)]], 60);
    let logs = fixture.export("dest", "inv", "logs", "2024-04-15T00-00Z", &[&[("b", 1)]], 3600);

    let located = engine(&fixture, EngineConfig::default())
        .locate_latest_manifests(&names(&["dest"]))
        .await
        .unwrap();

    assert_eq!(located.len(), 2);
    assert_eq!(located["photos"].len(), 1);
    assert_eq!(located["photos"][0].key, newest);
    assert_eq!(located["photos"][0].destination_bucket, "dest");
    assert_eq!(located["logs"][0].key, logs);
}

#[tokio::test]
async fn test_locate_missing_bucket_aborts() {
    let fixture = InventoryFixture::new();
    fixture.export("dest", "inv", "photos", "run", &[&[("a", 1)]], 0);

    let err = engine(&fixture, EngineConfig::default())
        .locate_latest_manifests(&names(&["dest", "absent"]))
        .await
        .unwrap_err();
    assert!(matches!(err, IxError::Gateway(GatewayError::NoSuchBucket(b)) if b == "absent"));
}

#[tokio::test]
async fn test_search_groups_by_first_matching_folder() {
    let fixture = InventoryFixture::new();
    let manifest = fixture.export(
        "dest",
        "inv",
        "app",
        "run",
        &[
            &[
                ("2024/logs/app/out.txt", 100),
                ("2024/logs/app/err.txt", 50),
                ("2024/img/cat.png", 9000),
            ],
            &[("archive/Old-Logs/x.gz", 25), ("readme-logs.txt", 5)],
        ],
        0,
    );

    let report = engine(&fixture, EngineConfig::default())
        .search("dest", &[manifest], "logs", &CancellationToken::new())
        .await
        .unwrap();

    let rows: Vec<_> = report
        .results
        .iter()
        .map(|r| (r.folder_path.as_str(), r.total_size, r.file_count))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("2024/logs", 150, 2),
            ("archive/Old-Logs", 25, 1),
            ("readme-logs.txt", 5, 1),
        ]
    );
    assert_eq!(report.total_folders, 3);
    assert_eq!(report.total_size, 180);
    assert!(report.failed_parts.is_empty());
    assert_eq!(report.stats.parts_succeeded, 2);
    assert_eq!(report.stats.rows_scanned, 5);
}

#[tokio::test]
async fn test_results_independent_of_chunking_and_concurrency() {
    let fixture = InventoryFixture::new();
    let rows: Vec<(String, u64)> = (0..250)
        .map(|i| (format!("d{}/sub{}/file-{i}.bin", i % 4, i % 3), i as u64))
        .collect();
    let parts: Vec<Vec<(&str, u64)>> = rows
        .chunks(60)
        .map(|chunk| chunk.iter().map(|(k, s)| (k.as_str(), *s)).collect())
        .collect();
    let part_refs: Vec<&[(&str, u64)]> = parts.iter().map(Vec::as_slice).collect();
    let manifest = fixture.export("dest", "inv", "bulk", "run", &part_refs, 0);
    let manifests = vec![manifest];

    let mut outputs = Vec::new();
    for config in [
        EngineConfig::new().with_max_concurrent_parts(1).with_chunk_size(100_000),
        EngineConfig::new().with_max_concurrent_parts(2).with_chunk_size(7),
        EngineConfig::new().with_max_concurrent_parts(16).with_chunk_size(1),
    ] {
        let report = engine(&fixture, config)
            .path_size("dest", &manifests, 2, &CancellationToken::new())
            .await
            .unwrap();
        outputs.push((report.results, report.total_size, report.total_paths));
    }

    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[1], outputs[2]);
    assert_eq!(outputs[0].1, (0..250).sum::<u64>());
    assert_eq!(outputs[0].2, 12);
}

#[tokio::test]
async fn test_corrupt_part_is_excluded() {
    let fixture = InventoryFixture::new();
    let manifest = fixture.export(
        "dest",
        "inv",
        "app",
        "run",
        &[&[("a/b/one", 10)], &[("a/b/two", 20)]],
        0,
    );
    // Truncated gzip in place of the second part
    let good = gzip_inventory("app", &[("a/b/two", 20)]);
    fixture.put("dest", "inv/app/run/data/part-1.csv.gz", &good[..good.len() / 2]);

    let report = engine(&fixture, EngineConfig::default())
        .path_size("dest", &[manifest], 2, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.failed_parts.len(), 1);
    assert_eq!(report.failed_parts[0].key, "inv/app/run/data/part-1.csv.gz");
    assert_eq!(report.stats.parts_failed, 1);
    assert_eq!(report.total_size, 10);
    assert_eq!(report.results[0].path, "a/b");
}

#[tokio::test]
async fn test_extra_columns_and_bad_sizes_tolerated() {
    let fixture = InventoryFixture::new();
    fixture.put(
        "dest",
        "inv/app/run/data/wide.csv.gz",
        &gzip_text(
            "\"dest\",\"x/y/1\",\"100\",\"2024-05-01\",\"STANDARD\",\"false\"\n\
             \"dest\",\"x/y/2\",\"\",\"2024-05-01\",\"STANDARD\",\"true\"\n\
             \"dest\",\"x/z/3\",\"12.9\",\"2024-05-01\",\"GLACIER\",\"false\"\n",
        ),
    );
    fixture.put(
        "dest",
        "inv/app/run/manifest.json",
        br#"{"files": [{"key": "inv/app/run/data/wide.csv.gz"}]}"#,
    );

    let report = engine(&fixture, EngineConfig::default())
        .path_size(
            "dest",
            &names(&["inv/app/run/manifest.json"]),
            2,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let rows: Vec<_> = report
        .results
        .iter()
        .map(|r| (r.path.as_str(), r.total_size, r.object_count))
        .collect();
    assert_eq!(rows, vec![("x/y", 100, 2), ("x/z", 12, 1)]);
}

#[tokio::test]
async fn test_invalid_manifest_aborts_query() {
    let fixture = InventoryFixture::new();
    fixture.put("dest", "inv/app/run/manifest.json", b"{\"files\": 3}");

    let err = engine(&fixture, EngineConfig::default())
        .search(
            "dest",
            &names(&["inv/app/run/manifest.json"]),
            "logs",
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, IxError::Manifest(_)));
}

fn gzip_text(text: &str) -> Vec<u8> {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}
