//! Shared AWS SDK configuration

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_ssm::config::{Credentials, Region};
use ssmenv_core::{AwsCredentials, SdkOptions};
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Provider name reported by credentials built from configuration
const STATIC_PROVIDER: &str = "ssmenv";

/// Load an SDK configuration honoring region, endpoint, retry and credential options
pub async fn load_sdk_config(options: &SdkOptions) -> SdkConfig {
    let retry = RetryConfig::standard()
        .with_max_attempts(options.max_attempts())
        .with_initial_backoff(Duration::from_millis(options.retry_base_delay_millis));

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).retry_config(retry);

    if let Some(region) = &options.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(endpoint_url) = &options.endpoint_url {
        debug!("Using custom AWS endpoint: {}", endpoint_url);
        loader = loader.endpoint_url(endpoint_url);
    }

    if let Some(credentials) = &options.credentials {
        debug!(
            "Using configured credentials for access key {}",
            credentials.access_key_id
        );
        loader = loader.credentials_provider(sdk_credentials(credentials));
    }

    loader.load().await
}

fn sdk_credentials(credentials: &AwsCredentials) -> Credentials {
    Credentials::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.clone(),
        credentials.session_token.clone(),
        credentials.expiration.map(SystemTime::from),
        STATIC_PROVIDER,
    )
}
