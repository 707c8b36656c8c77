//! Core traits for invex.
//!
//! This crate defines the seams between the aggregation core and its
//! collaborators:
//! - [`ObjectGateway`] - List and fetch objects (S3, local filesystem)
//! - [`ManifestCacheStore`] - Remembered manifests per destination bucket
//! - [`BucketHistoryStore`] - Buckets the operator has queried before

pub mod gateway;
pub mod store;

pub use gateway::*;
pub use store::*;
