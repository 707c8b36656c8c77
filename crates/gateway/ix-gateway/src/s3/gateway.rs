//! S3 implementation of the object gateway.

use super::client::{S3Config, create_s3_client, credentials_failure};
use super::retry::{RetryConfig, with_retry};
use async_trait::async_trait;
use aws_credential_types::provider::error::CredentialsError;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use chrono::DateTime;
use ix_error::{GatewayError, IxError, Result};
use ix_traits::{ObjectBody, ObjectGateway};
use ix_types::ObjectEntry;
use tracing::debug;

/// Object gateway backed by S3.
///
/// The SDK client is cheap to clone and safe to share; one gateway serves
/// every concurrent part-file task.
#[derive(Clone)]
pub struct S3Gateway {
    client: Client,
    retry: RetryConfig,
}

impl S3Gateway {
    /// Wrap an existing client.
    pub fn new(client: Client, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    /// Build a client from configuration and wrap it.
    pub async fn connect(config: &S3Config) -> Result<Self> {
        let client = create_s3_client(config).await?;
        Ok(Self::new(client, config.retry.clone()))
    }
}

#[async_trait]
impl ObjectGateway for S3Gateway {
    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<ObjectEntry>> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let resp = with_retry(&self.retry, "list_objects", || {
                let mut req = self.client.list_objects_v2().bucket(bucket);

                if let Some(prefix) = prefix {
                    req = req.prefix(prefix);
                }

                if let Some(ref token) = continuation_token {
                    req = req.continuation_token(token);
                }

                async move {
                    req.send()
                        .await
                        .map_err(|e| classify_sdk_error(&e, bucket, None))
                }
            })
            .await?;
            pages += 1;

            if let Some(contents) = resp.contents {
                for obj in contents {
                    let key = obj.key.unwrap_or_default();

                    // Skip directory markers and empty keys
                    if key.is_empty() || key.ends_with('/') {
                        continue;
                    }

                    let last_modified = obj
                        .last_modified
                        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()));

                    objects.push(ObjectEntry {
                        key,
                        size: obj.size.unwrap_or(0).max(0) as u64,
                        last_modified,
                    });
                }
            }

            if resp.is_truncated == Some(true) {
                continuation_token = resp.next_continuation_token;
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        debug!(
            bucket = bucket,
            prefix = prefix.unwrap_or(""),
            pages = pages,
            object_count = objects.len(),
            "Listed bucket"
        );

        Ok(objects)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        let resp = with_retry(&self.retry, "get_object", || {
            let req = self.client.get_object().bucket(bucket).key(key);
            async move {
                req.send()
                    .await
                    .map_err(|e| classify_sdk_error(&e, bucket, Some(key)))
            }
        })
        .await?;

        debug!(
            bucket = bucket,
            key = key,
            content_length = resp.content_length.unwrap_or(-1),
            "Opened object"
        );

        Ok(Box::pin(resp.body.into_async_read()))
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}

/// Credential lookup failure buried in an error's source chain, if any.
fn credentials_cause<'a>(
    error: &'a (dyn std::error::Error + 'static),
) -> Option<&'a CredentialsError> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(credentials) = err.downcast_ref::<CredentialsError>() {
            return Some(credentials);
        }
        current = err.source();
    }
    None
}

/// Map an SDK failure onto the gateway taxonomy, keeping the cause text.
fn classify_sdk_error<E>(error: &SdkError<E>, bucket: &str, key: Option<&str>) -> IxError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let target = match key {
        Some(key) => format!("s3://{bucket}/{key}"),
        None => format!("s3://{bucket}"),
    };
    let detail = DisplayErrorContext(error).to_string();

    match error {
        SdkError::DispatchFailure(_) => {
            if let Some(credentials) = credentials_cause(error) {
                return credentials_failure(credentials).into();
            }
            return GatewayError::Io(format!("{target}: {detail}")).into();
        }
        SdkError::TimeoutError(_) => {
            return GatewayError::Io(format!("{target}: {detail}")).into();
        }
        SdkError::ConstructionFailure(_) => {
            return GatewayError::Api {
                code: "ConstructionFailure".to_string(),
                message: detail,
            }
            .into();
        }
        _ => {}
    }

    let service_error = error.as_service_error();
    let code = service_error.and_then(|e| e.code());
    let message = service_error
        .and_then(|e| e.message())
        .unwrap_or(&detail)
        .to_string();
    let status = error.raw_response().map(|r| r.status().as_u16());

    classify_error_code(code, status, message, bucket, &target).into()
}

/// Classify an S3 error code (or bare HTTP status when no code was sent).
fn classify_error_code(
    code: Option<&str>,
    status: Option<u16>,
    message: String,
    bucket: &str,
    target: &str,
) -> GatewayError {
    match code {
        Some("NoSuchBucket") => GatewayError::NoSuchBucket(bucket.to_string()),
        Some("NoSuchKey") | Some("NotFound") => GatewayError::NotFound(target.to_string()),
        Some("AccessDenied") | Some("AllAccessDisabled") | Some("Forbidden") => {
            GatewayError::AccessDenied(target.to_string())
        }
        Some("InvalidAccessKeyId")
        | Some("SignatureDoesNotMatch")
        | Some("InvalidClientTokenId")
        | Some("InvalidToken") => GatewayError::InvalidCredentials(message),
        Some("ExpiredToken") | Some("TokenRefreshRequired") => {
            GatewayError::ExpiredCredentials(message)
        }
        Some("SlowDown") | Some("Throttling") | Some("TooManyRequests") => {
            GatewayError::Throttled(message)
        }
        Some(code) => GatewayError::Api {
            code: code.to_string(),
            message,
        },
        None => match status {
            Some(404) => GatewayError::NotFound(target.to_string()),
            Some(403) => GatewayError::AccessDenied(target.to_string()),
            Some(429) => GatewayError::Throttled(message),
            Some(status) => GatewayError::Api {
                code: status.to_string(),
                message,
            },
            None => GatewayError::Api {
                code: "Unknown".to_string(),
                message,
            },
        },
    }
}
