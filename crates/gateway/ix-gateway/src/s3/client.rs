//! S3 client configuration and creation.

use super::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_config::timeout::TimeoutConfig;
use aws_credential_types::provider::error::CredentialsError;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::ProvideCredentials;
use aws_sdk_s3::error::DisplayErrorContext;
use ix_error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for S3 access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// AWS region
    pub region: Option<String>,

    /// Custom endpoint URL (for LocalStack)
    pub endpoint: Option<String>,

    /// Explicit AWS access key (optional)
    pub access_key: Option<String>,

    /// Explicit AWS secret key (optional)
    pub secret_key: Option<String>,

    /// Session token for temporary credentials (optional)
    pub session_token: Option<String>,

    /// AWS profile name (optional)
    pub profile: Option<String>,

    /// Per-operation timeout in seconds
    pub timeout_secs: u64,

    /// Retry behaviour for transient failures
    pub retry: RetryConfig,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: None,
            endpoint: None,
            access_key: None,
            secret_key: None,
            session_token: None,
            profile: None,
            timeout_secs: 300,
            retry: RetryConfig::default(),
        }
    }
}

impl S3Config {
    /// Create a new S3Config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom endpoint (for LocalStack).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the AWS region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set explicit credentials.
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self.session_token = session_token;
        self
    }

    /// Set the AWS profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the operation timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Checks that explicit credentials come in pairs.
    pub fn validate(&self) -> Result<()> {
        match (&self.access_key, &self.secret_key) {
            (Some(_), None) => Err(GatewayError::MissingCredentials(
                "AWS_SECRET_ACCESS_KEY".to_string(),
            )
            .into()),
            (None, Some(_)) => {
                Err(GatewayError::MissingCredentials("AWS_ACCESS_KEY_ID".to_string()).into())
            }
            _ => Ok(()),
        }
    }
}

/// Create an S3 client from configuration.
///
/// Credentials are resolved before the client is returned, so a machine
/// with nothing in the provider chain fails here with `MissingCredentials`
/// rather than on the first request.
pub async fn create_s3_client(config: &S3Config) -> Result<Client> {
    use aws_config::Region;

    config.validate()?;

    let mut aws_config_loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(
        TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(config.timeout_secs))
            .build(),
    );

    if let Some(region) = &config.region {
        aws_config_loader = aws_config_loader.region(Region::new(region.clone()));
    }

    if let Some(endpoint) = &config.endpoint {
        aws_config_loader = aws_config_loader.endpoint_url(endpoint);
    }

    // Explicit credentials win over the default provider chain
    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        debug!(
            session_token = config.session_token.is_some(),
            "Using explicit AWS credentials"
        );
        let credentials = aws_sdk_s3::config::Credentials::new(
            access_key,
            secret_key,
            config.session_token.clone(),
            None,
            "invex",
        );
        aws_config_loader = aws_config_loader.credentials_provider(credentials);
    }

    if let Some(profile) = &config.profile {
        aws_config_loader = aws_config_loader.profile_name(profile);
    }

    let aws_config = aws_config_loader.load().await;

    let provider = aws_config.credentials_provider().ok_or_else(|| {
        GatewayError::MissingCredentials("no credentials provider configured".to_string())
    })?;
    provider
        .provide_credentials()
        .await
        .map_err(|e| credentials_failure(&e))?;
    debug!("Resolved AWS credentials");

    let s3_config_builder = aws_sdk_s3::config::Builder::from(&aws_config);

    // Path-style addressing for custom endpoints (LocalStack, MinIO)
    let s3_config = if config.endpoint.is_some() {
        s3_config_builder.force_path_style(true).build()
    } else {
        s3_config_builder.build()
    };

    Ok(Client::from_conf(s3_config))
}

/// Maps a provider-chain failure onto the gateway's credential errors.
pub(crate) fn credentials_failure(error: &CredentialsError) -> GatewayError {
    let detail = DisplayErrorContext(error).to_string();
    match error {
        CredentialsError::CredentialsNotLoaded(_) => GatewayError::MissingCredentials(detail),
        CredentialsError::ProviderTimedOut(_) => GatewayError::Io(detail),
        _ => GatewayError::InvalidCredentials(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ix_error::{ErrorCategory, IxError, classify_error, user_message};
    use std::time::Duration;

    #[test]
    fn test_s3_config_builder() {
        let config = S3Config::new()
            .with_endpoint("http://localhost:4566")
            .with_region("us-east-1")
            .with_profile("ops")
            .with_timeout(60);

        assert_eq!(config.endpoint, Some("http://localhost:4566".to_string()));
        assert_eq!(config.region, Some("us-east-1".to_string()));
        assert_eq!(config.profile, Some("ops".to_string()));
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_s3_config_with_credentials() {
        let config =
            S3Config::new().with_credentials("access", "secret", Some("token".to_string()));

        assert_eq!(config.access_key, Some("access".to_string()));
        assert_eq!(config.secret_key, Some("secret".to_string()));
        assert_eq!(config.session_token, Some("token".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_s3_config_default() {
        let config = S3Config::default();

        assert!(config.endpoint.is_none());
        assert!(config.access_key.is_none());
        assert_eq!(config.timeout_secs, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_half_credentials() {
        let mut config = S3Config::new();
        config.access_key = Some("access".to_string());

        match config.validate() {
            Err(IxError::Gateway(GatewayError::MissingCredentials(missing))) => {
                assert_eq!(missing, "AWS_SECRET_ACCESS_KEY");
            }
            other => panic!("Expected MissingCredentials, got: {:?}", other),
        }
    }

    #[test]
    fn test_unloaded_credentials_are_missing() {
        let error = CredentialsError::not_loaded("no credentials found in chain");

        let mapped = credentials_failure(&error);
        assert!(matches!(mapped, GatewayError::MissingCredentials(_)));

        let error = IxError::from(mapped);
        assert_eq!(classify_error(&error), ErrorCategory::Credentials);
        assert_eq!(
            user_message(&error),
            "AWS credentials are missing. Please check your environment."
        );
    }

    #[test]
    fn test_other_provider_failures() {
        let timed_out = CredentialsError::provider_timed_out(Duration::from_secs(5));
        assert!(matches!(credentials_failure(&timed_out), GatewayError::Io(_)));

        let misconfigured = CredentialsError::invalid_configuration("bad profile");
        assert!(matches!(
            credentials_failure(&misconfigured),
            GatewayError::InvalidCredentials(_)
        ));
    }
}
