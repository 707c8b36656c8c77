//! S3 gateway.
//!
//! - Client configuration with LocalStack support and explicit credentials
//! - Paginated `ListObjectsV2`, streaming `GetObject`
//! - Retry with exponential backoff for transient failures

mod client;
mod gateway;
mod retry;

pub use client::{S3Config, create_s3_client};
pub use gateway::S3Gateway;
pub use retry::{RetryConfig, with_retry};
