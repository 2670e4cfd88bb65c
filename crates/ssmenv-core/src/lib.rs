//! # ssmenv-core
//!
//! Core library for ssmenv providing:
//! - The typed configuration surface (`names`, `paths`, cache and elevation options)
//! - Configuration file loading (YAML or JSON) and validation
//! - The error taxonomy shared by the resolver engine and the CLI

pub mod config;
pub mod error;
pub mod types;

pub use config::ParameterOptions;
pub use error::{Error, ErrorKind, Result};
pub use types::{
    AssumeRoleOptions, AwsCredentials, PathSpec, SdkOptions, StsOptions, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_BASE_DELAY_MS,
};
