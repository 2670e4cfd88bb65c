//! Configuration value types shared by the engine and the CLI
//!
//! These types mirror the recognized option surface. Every struct rejects
//! unknown fields so a misspelled option fails loudly instead of being
//! silently ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of retries handed to the AWS clients.
///
/// Higher than the SDK default to lower the chance of hitting service rate limits.
pub const DEFAULT_MAX_RETRIES: u32 = 6;

/// Default base delay for the SDK's exponential backoff, in milliseconds
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 200;

/// One or more remote path prefixes bound to a local prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSpec {
    One(String),
    Many(Vec<String>),
}

impl PathSpec {
    /// The remote path prefixes in declaration order
    pub fn paths(&self) -> Vec<&str> {
        match self {
            PathSpec::One(path) => vec![path.as_str()],
            PathSpec::Many(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        PathSpec::One(path.to_string())
    }
}

impl From<Vec<&str>> for PathSpec {
    fn from(paths: Vec<&str>) -> Self {
        PathSpec::Many(paths.into_iter().map(str::to_string).collect())
    }
}

/// Static or temporary AWS credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    /// Only set for credentials issued by role assumption
    #[serde(skip)]
    pub expiration: Option<DateTime<Utc>>,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            expiration: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Provider-level client options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SdkOptions {
    /// AWS region; falls back to the SDK's region provider chain
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint (e.g. LocalStack)
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_millis: u64,

    /// Static credentials; falls back to the SDK's credential provider chain
    #[serde(default)]
    pub credentials: Option<AwsCredentials>,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_base_delay() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}

impl Default for SdkOptions {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            max_retries: default_max_retries(),
            retry_base_delay_millis: default_retry_base_delay(),
            credentials: None,
        }
    }
}

impl SdkOptions {
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Shallow merge: the given credentials replace any configured ones,
    /// everything else is kept.
    pub fn with_credentials(&self, credentials: AwsCredentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..self.clone()
        }
    }

    /// Total attempts the SDK should make per call
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Role assumption request options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssumeRoleOptions {
    #[serde(default)]
    pub role_arn: Option<String>,

    /// Defaults to a time-suffixed session name when absent
    #[serde(default)]
    pub role_session_name: Option<String>,

    #[serde(default)]
    pub external_id: Option<String>,

    #[serde(default)]
    pub duration_seconds: Option<i32>,
}

impl AssumeRoleOptions {
    pub fn for_role(role_arn: impl Into<String>) -> Self {
        Self {
            role_arn: Some(role_arn.into()),
            ..Default::default()
        }
    }

    /// The role ARN when it is present and non-empty
    pub fn target_role(&self) -> Option<&str> {
        self.role_arn
            .as_deref()
            .map(str::trim)
            .filter(|arn| !arn.is_empty())
    }
}

/// Privilege elevation options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StsOptions {
    #[serde(default)]
    pub assume_role_options: Option<AssumeRoleOptions>,

    /// Options for the credential-issuing client itself
    #[serde(default)]
    pub aws_sdk_options: Option<SdkOptions>,
}

impl StsOptions {
    /// Role assumption settings, if they name a role to assume.
    ///
    /// A present-but-empty configuration is treated as absent.
    pub fn elevation(&self) -> Option<(&AssumeRoleOptions, &str)> {
        let options = self.assume_role_options.as_ref()?;
        options.target_role().map(|arn| (options, arn))
    }
}
