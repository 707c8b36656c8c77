//! ix-gateway - object store gateways for invex.
//!
//! Two implementations of [`ObjectGateway`](ix_traits::ObjectGateway):
//!
//! - [`S3Gateway`] - AWS S3 (or any S3-compatible endpoint) via `aws-sdk-s3`,
//!   with paginated listing, retry with backoff, and error-code classification
//! - [`LocalGateway`] - a directory tree where each top-level directory is a
//!   bucket, for offline runs and tests
//!
//! # Example
//!
//! ```ignore
//! use ix_gateway::{S3Config, S3Gateway};
//!
//! let config = S3Config::new()
//!     .with_region("us-east-1")
//!     .with_endpoint("http://localhost:4566");
//!
//! let gateway = S3Gateway::connect(&config).await?;
//! let objects = gateway.list_objects("inventory-bucket", None).await?;
//! ```

mod local;
pub mod s3;

pub use local::LocalGateway;
pub use s3::{RetryConfig, S3Config, S3Gateway, create_s3_client, with_retry};
