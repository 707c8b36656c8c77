//! ix-service - request layer for invex.
//!
//! [`InventoryService`] is the one place that holds state: it remembers the
//! buckets an operator has queried ([`BucketHistoryStore`]) and the manifests
//! found in them ([`ManifestCacheStore`]), and forwards queries to a
//! stateless [`ix_engine::InventoryEngine`].
//!
//! Operations mirror the request surface:
//!
//! | Operation | Request | Response |
//! |-----------|---------|----------|
//! | [`InventoryService::buckets`] | - | bucket names |
//! | [`InventoryService::add_buckets`] | names | updated names |
//! | [`InventoryService::fetch_manifests`] | [`FetchManifestsRequest`] | [`ManifestListing`] |
//! | [`InventoryService::cached_manifests`] | bucket names | [`ManifestListing`] |
//! | [`InventoryService::search`] | [`SearchRequest`] | [`SearchResponse`] |
//! | [`InventoryService::path_size`] | [`PathSizeRequest`] | [`PathSizeReport`](ix_types::PathSizeReport) |
//! | [`InventoryService::export_csv`] | [`ExportRequest`] | CSV text |
//!
//! [`BucketHistoryStore`]: ix_traits::BucketHistoryStore
//! [`ManifestCacheStore`]: ix_traits::ManifestCacheStore

mod api;
mod config;
mod export;
mod service;
mod store;

pub use api::*;
pub use config::ServiceConfig;
pub use export::{folders_to_csv, paths_to_csv};
pub use service::{InventoryService, NO_MANIFESTS_MESSAGE};
pub use store::{JsonFileCacheStore, JsonFileHistoryStore, MemoryCacheStore, MemoryHistoryStore};
