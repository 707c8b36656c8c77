//! Error types and classification for invex.
//!
//! This crate provides:
//! - [`IxError`] - Top-level error enum for every inventory operation
//! - Domain-specific errors ([`GatewayError`], [`ReaderError`], [`ManifestError`], [`StoreError`])
//! - [`ErrorCategory`] - the small fixed set of user-facing failure categories
//! - [`classify_error`] - maps any error onto its category

use serde::Serialize;
use thiserror::Error;

/// Top-level error type for invex.
#[derive(Error, Debug)]
pub enum IxError {
    /// Object store gateway errors (listing, fetching)
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Part-file reader errors (decompression, parsing)
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    /// Manifest document errors
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Cache and history persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Caller supplied an invalid or incomplete request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Nothing matched the request (e.g. no manifests in any bucket)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation was cancelled before completion
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors surfaced by an object store gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No credentials could be resolved
    #[error("Missing required credentials: {0}")]
    MissingCredentials(String),

    /// Access key or secret rejected by the service
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Session token has expired
    #[error("Session token has expired: {0}")]
    ExpiredCredentials(String),

    /// Access denied on a bucket or key
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Bucket does not exist
    #[error("Bucket does not exist: {0}")]
    NoSuchBucket(String),

    /// Object does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Service asked us to slow down
    #[error("Throttled: {0}")]
    Throttled(String),

    /// Any other service error, with its error code preserved
    #[error("API error: {code} - {message}")]
    Api { code: String, message: String },

    /// Transport or local I/O failure
    #[error("I/O error: {0}")]
    Io(String),
}

/// Part-file reader errors.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// Decompression failed
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// Delimited text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error while consuming the stream
    #[error("I/O error: {0}")]
    Io(String),
}

/// Manifest document errors.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest body is not a valid manifest document
    #[error("Invalid manifest '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

/// Cache/history persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error on '{path}': {reason}")]
    Io { path: String, reason: String },

    /// Backing file holds invalid JSON
    #[error("Corrupt store '{path}': {reason}")]
    Corrupt { path: String, reason: String },
}

/// User-facing error categories.
///
/// Every failure collapses into one of these so callers can map errors to a
/// status and a stable message without inspecting error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing, invalid or expired credentials
    Credentials,

    /// Access denied on a bucket or key
    Authorization,

    /// Bucket, manifest or part-file absent
    NotFound,

    /// Data could not be decoded
    MalformedData,

    /// Worth retrying: throttling, network trouble
    Transient,

    /// The request itself is wrong
    InvalidInput,

    /// Caller cancelled the operation
    Cancelled,

    /// Anything else
    Internal,
}

impl ErrorCategory {
    /// HTTP-style status code for this category.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Credentials => 401,
            Self::Authorization => 403,
            Self::NotFound => 404,
            Self::MalformedData => 422,
            Self::Transient => 503,
            Self::InvalidInput => 400,
            Self::Cancelled => 499,
            Self::Internal => 500,
        }
    }

    /// Whether an operation failing with this category may succeed on retry.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient)
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credentials => write!(f, "Credentials"),
            Self::Authorization => write!(f, "Authorization"),
            Self::NotFound => write!(f, "NotFound"),
            Self::MalformedData => write!(f, "MalformedData"),
            Self::Transient => write!(f, "Transient"),
            Self::InvalidInput => write!(f, "InvalidInput"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Internal => write!(f, "Internal"),
        }
    }
}

/// Classifies an error into its user-facing category.
pub fn classify_error(error: &IxError) -> ErrorCategory {
    match error {
        IxError::Gateway(e) => classify_gateway_error(e),
        IxError::Reader(e) => classify_reader_error(e),
        IxError::Manifest(_) => ErrorCategory::MalformedData,
        IxError::Store(_) => ErrorCategory::Internal,
        IxError::InvalidInput(_) => ErrorCategory::InvalidInput,
        IxError::NotFound(_) => ErrorCategory::NotFound,
        IxError::Cancelled => ErrorCategory::Cancelled,
        IxError::Other(_) => ErrorCategory::Internal,
    }
}

fn classify_gateway_error(error: &GatewayError) -> ErrorCategory {
    match error {
        GatewayError::MissingCredentials(_) => ErrorCategory::Credentials,
        GatewayError::InvalidCredentials(_) => ErrorCategory::Credentials,
        GatewayError::ExpiredCredentials(_) => ErrorCategory::Credentials,
        GatewayError::AccessDenied(_) => ErrorCategory::Authorization,
        GatewayError::NoSuchBucket(_) => ErrorCategory::NotFound,
        GatewayError::NotFound(_) => ErrorCategory::NotFound,
        GatewayError::Throttled(_) => ErrorCategory::Transient,
        GatewayError::Api { code, .. } => classify_api_code(code),
        GatewayError::Io(_) => ErrorCategory::Transient,
    }
}

fn classify_reader_error(error: &ReaderError) -> ErrorCategory {
    match error {
        ReaderError::Decompression(_) => ErrorCategory::MalformedData,
        ReaderError::Parse(_) => ErrorCategory::MalformedData,
        ReaderError::Io(_) => ErrorCategory::Transient,
    }
}

fn classify_api_code(code: &str) -> ErrorCategory {
    match code {
        "InternalError" | "ServiceUnavailable" | "RequestTimeout" | "SlowDown" => {
            ErrorCategory::Transient
        }
        _ if code.starts_with('5') => ErrorCategory::Transient,
        _ => ErrorCategory::Internal,
    }
}

/// Fixed user-facing message for an error.
///
/// Credential and authorization failures get stable wording; everything else
/// carries the error text.
pub fn user_message(error: &IxError) -> String {
    match error {
        IxError::Gateway(GatewayError::MissingCredentials(_)) => {
            "AWS credentials are missing. Please check your environment.".to_string()
        }
        IxError::Gateway(GatewayError::InvalidCredentials(_)) => {
            "Invalid AWS credentials. Please check your AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY."
                .to_string()
        }
        IxError::Gateway(GatewayError::ExpiredCredentials(_)) => {
            "AWS session token has expired. Please refresh your credentials.".to_string()
        }
        IxError::Gateway(GatewayError::AccessDenied(_)) => {
            "Access denied. Please check if your AWS credentials have the necessary permissions."
                .to_string()
        }
        IxError::Gateway(GatewayError::NoSuchBucket(bucket)) => {
            format!("Bucket {bucket} does not exist. Please check the bucket name.")
        }
        other => other.to_string(),
    }
}

/// Result type alias using IxError.
pub type Result<T> = std::result::Result<T, IxError>;
