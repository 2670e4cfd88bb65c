//! Optional privilege elevation
//!
//! When `stsOptions.assumeRoleOptions.roleArn` is set, temporary credentials
//! are requested before the store client is built, and the client is
//! configured with them. Anything else is a no-op.

pub mod sts;

pub use sts::StsCredentialIssuer;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ssmenv_core::{AssumeRoleOptions, AwsCredentials, Error, Result, SdkOptions, StsOptions};
use std::sync::Arc;
use tracing::{debug, info};

/// Fixed prefix for generated session names
pub const SESSION_NAME_PREFIX: &str = "ssmenv-session";

/// A role assumption request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub role_session_name: String,
    pub external_id: Option<String>,
    pub duration_seconds: Option<i32>,
}

impl AssumeRoleRequest {
    /// Build a request, generating a session name when none is configured
    pub fn from_options(options: &AssumeRoleOptions, role_arn: &str, now: DateTime<Utc>) -> Self {
        Self {
            role_arn: role_arn.to_string(),
            role_session_name: options
                .role_session_name
                .clone()
                .unwrap_or_else(|| default_session_name(now)),
            external_id: options.external_id.clone(),
            duration_seconds: options.duration_seconds,
        }
    }
}

/// `<prefix>-<epoch millis>`, unique per process start
pub fn default_session_name(now: DateTime<Utc>) -> String {
    format!("{}-{}", SESSION_NAME_PREFIX, now.timestamp_millis())
}

/// Issues temporary credentials for a role
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// `sdk_options` configures the issuing client itself
    async fn assume_role(
        &self,
        sdk_options: &SdkOptions,
        request: &AssumeRoleRequest,
    ) -> Result<AwsCredentials>;
}

/// Resolves the provider options the store client should be built with
#[derive(Clone)]
pub struct CredentialElevator {
    issuer: Arc<dyn CredentialIssuer>,
}

impl CredentialElevator {
    pub fn new(issuer: Arc<dyn CredentialIssuer>) -> Self {
        Self { issuer }
    }

    /// Assume the configured role, if any, and merge the temporary
    /// credentials into `store_options`.
    ///
    /// Without a non-empty role ARN this returns `store_options` unchanged
    /// and never contacts the issuer.
    pub async fn ensure_elevated(
        &self,
        sts_options: Option<&StsOptions>,
        store_options: &SdkOptions,
        now: DateTime<Utc>,
    ) -> Result<SdkOptions> {
        let Some((assume, role_arn)) = sts_options.and_then(StsOptions::elevation) else {
            debug!("No role to assume; using configured credentials");
            return Ok(store_options.clone());
        };

        let request = AssumeRoleRequest::from_options(assume, role_arn, now);
        let issuer_options = sts_options
            .and_then(|sts| sts.aws_sdk_options.clone())
            .unwrap_or_default();

        debug!(
            "Assuming role {} as session {}",
            request.role_arn, request.role_session_name
        );

        let credentials = self
            .issuer
            .assume_role(&issuer_options, &request)
            .await
            .map_err(|e| match e {
                Error::Elevation { .. } => e,
                other => {
                    let message = other.to_string();
                    Error::elevation(role_arn, message, other)
                }
            })?;

        info!(
            "Assumed role {} (expires {})",
            role_arn,
            credentials
                .expiration
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string())
        );

        Ok(store_options.with_credentials(credentials))
    }
}

impl std::fmt::Debug for CredentialElevator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialElevator").finish_non_exhaustive()
    }
}
