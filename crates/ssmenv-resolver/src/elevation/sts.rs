//! AWS STS credential issuer

use super::{AssumeRoleRequest, CredentialIssuer};
use crate::aws::load_sdk_config;
use async_trait::async_trait;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client;
use chrono::DateTime;
use ssmenv_core::{AwsCredentials, Error, Result, SdkOptions};
use tracing::debug;

/// Issues credentials through `sts:AssumeRole`
#[derive(Debug, Clone, Copy, Default)]
pub struct StsCredentialIssuer;

#[async_trait]
impl CredentialIssuer for StsCredentialIssuer {
    async fn assume_role(
        &self,
        sdk_options: &SdkOptions,
        request: &AssumeRoleRequest,
    ) -> Result<AwsCredentials> {
        let sdk_config = load_sdk_config(sdk_options).await;
        let client = Client::new(&sdk_config);

        debug!("AssumeRole {}", request.role_arn);

        let output = client
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.role_session_name)
            .set_external_id(request.external_id.clone())
            .set_duration_seconds(request.duration_seconds)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                Error::elevation(request.role_arn.as_str(), message, e)
            })?;

        let credentials = output.credentials().ok_or_else(|| {
            Error::elevation_message(
                request.role_arn.as_str(),
                "AssumeRole response contained no credentials",
            )
        })?;

        let expires = credentials.expiration();
        let mut issued = AwsCredentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
        )
        .with_session_token(credentials.session_token());
        if let Some(expiration) = DateTime::from_timestamp(expires.secs(), expires.subsec_nanos()) {
            issued = issued.with_expiration(expiration);
        }

        Ok(issued)
    }
}
