//! Parameter request configuration
//!
//! `ParameterOptions` is the full recognized option surface of the engine:
//! what to fetch (`names`, `paths`, `prefix`), where to write it
//! (`setToContext`), how long to keep it (`cache`, `cacheExpiryInMillis`)
//! and how to reach the store (`awsSdkOptions`, `stsOptions`).

mod loader;

pub use loader::CONFIG_FILE_NAMES;

use crate::error::{Error, Result};
use crate::types::{PathSpec, SdkOptions, StsOptions};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Declarative set of wanted values plus engine behavior switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParameterOptions {
    /// Local key -> remote parameter name
    #[serde(default)]
    pub names: IndexMap<String, String>,

    /// Local prefix -> one or more remote path prefixes
    #[serde(default)]
    pub paths: IndexMap<String, PathSpec>,

    /// Prepended to keys derived from paths with a non-empty local prefix
    #[serde(default)]
    pub prefix: Option<String>,

    /// Also write values to the per-invocation context
    #[serde(default)]
    pub set_to_context: bool,

    /// Keep the resolved snapshot between invocations
    #[serde(default)]
    pub cache: bool,

    /// Snapshot lifetime; absent means load once
    #[serde(default)]
    pub cache_expiry_in_millis: Option<u64>,

    /// Optional role assumption before any store access
    #[serde(default)]
    pub sts_options: Option<StsOptions>,

    /// Parameter store client options
    #[serde(default)]
    pub aws_sdk_options: SdkOptions,
}

impl ParameterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a local key to a remote parameter name
    pub fn with_name(mut self, local_key: impl Into<String>, remote_name: impl Into<String>) -> Self {
        self.names.insert(local_key.into(), remote_name.into());
        self
    }

    /// Bind a local prefix to one or more remote path prefixes
    pub fn with_path(mut self, local_prefix: impl Into<String>, paths: impl Into<PathSpec>) -> Self {
        self.paths.insert(local_prefix.into(), paths.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_cache(mut self, expiry_millis: Option<u64>) -> Self {
        self.cache = true;
        self.cache_expiry_in_millis = expiry_millis;
        self
    }

    pub fn with_set_to_context(mut self, enabled: bool) -> Self {
        self.set_to_context = enabled;
        self
    }

    pub fn with_sts_options(mut self, sts_options: StsOptions) -> Self {
        self.sts_options = Some(sts_options);
        self
    }

    /// Snapshot lifetime as a duration
    pub fn cache_expiry(&self) -> Option<Duration> {
        self.cache_expiry_in_millis.map(Duration::from_millis)
    }

    /// Whether nothing at all is requested
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.paths.is_empty()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        for (local_key, remote_name) in &self.names {
            if local_key.trim().is_empty() {
                errors.push(format!("names: empty local key for '{}'", remote_name));
            } else if local_key.contains(['=', '\0']) {
                errors.push(format!(
                    "names.{}: local key must not contain '=' or NUL",
                    local_key.escape_debug()
                ));
            }
            if remote_name.trim().is_empty() {
                errors.push(format!("names.{}: remote parameter name is empty", local_key));
            }
        }

        for (local_prefix, spec) in &self.paths {
            let paths = spec.paths();
            if paths.is_empty() {
                errors.push(format!("paths.{}: at least one path is required", local_prefix));
            }
            for path in paths {
                if path.trim().is_empty() {
                    errors.push(format!("paths.{}: path prefix is empty", local_prefix));
                }
            }
        }

        if self.cache_expiry_in_millis == Some(0) {
            errors.push("cacheExpiryInMillis: must be greater than zero".to_string());
        }

        if let Some(assume) = self
            .sts_options
            .as_ref()
            .and_then(|sts| sts.assume_role_options.as_ref())
        {
            if matches!(assume.role_session_name.as_deref(), Some(name) if name.trim().is_empty()) {
                errors.push("stsOptions.assumeRoleOptions.roleSessionName: must not be empty".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid_config(errors.join("; ")))
        }
    }
}
