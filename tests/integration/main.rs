//! Integration tests for invex.
//!
//! The pipeline and request-layer tests run against the local filesystem
//! gateway and need nothing else. The S3 tests require LocalStack and are
//! marked `#[ignore]`.
//!
//! ## Running the S3 tests
//!
//! 1. Start LocalStack:
//!    ```bash
//!    docker run -d -p 4566:4566 localstack/localstack
//!    ```
//!
//! 2. Run the ignored tests:
//!    ```bash
//!    LOCALSTACK_ENDPOINT=http://localhost:4566 cargo test -p integration-tests -- --ignored
//!    ```

mod common;
mod pipeline_test;
mod s3_test;
mod service_test;
