//! Error types for ssmenv-core

use thiserror::Error;

/// Result type alias using ssmenv-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed source error carried by transport and elevation failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Broad failure category, used by hosts to decide how to report an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or conflicting configuration; no remote call was attempted
    Configuration,
    /// Temporary credential request failed
    Elevation,
    /// The parameter store reported requested names as invalid
    InvalidParameter,
    /// Remote call failed after the client's retries were exhausted
    Transport,
}

/// Core error types for ssmenv
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration
    #[error("Invalid parameter configuration: {message}")]
    InvalidConfig { message: String },

    /// Two different remote parameters resolve to the same local key
    #[error("Local key '{key}' is bound to both '{first}' and '{second}'")]
    KeyCollision {
        key: String,
        first: String,
        second: String,
    },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Role assumption failed
    #[error("Failed to assume role {role_arn}: {message}")]
    Elevation {
        role_arn: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The store reported invalid parameter names
    #[error("InvalidParameters present: {}", .names.join(", "))]
    InvalidParameters { names: Vec<String> },

    /// Remote call failure
    #[error("{operation} failed: {message}")]
    Transport {
        operation: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a key collision error
    pub fn key_collision(
        key: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::KeyCollision {
            key: key.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create an elevation error wrapping the issuer's failure
    pub fn elevation<E>(role_arn: impl Into<String>, message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Elevation {
            role_arn: role_arn.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create an elevation error that has no underlying cause
    pub fn elevation_message(role_arn: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Elevation {
            role_arn: role_arn.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid parameters error, keeping the order the store reported them in
    pub fn invalid_parameters(names: Vec<String>) -> Self {
        Self::InvalidParameters { names }
    }

    /// Create a transport error wrapping the client's failure
    pub fn transport<E>(operation: impl Into<String>, message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a transport error that has no underlying cause
    pub fn transport_message(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    /// The failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigNotFound { .. }
            | Error::InvalidConfig { .. }
            | Error::KeyCollision { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_) => ErrorKind::Configuration,
            Error::Elevation { .. } => ErrorKind::Elevation,
            Error::InvalidParameters { .. } => ErrorKind::InvalidParameter,
            Error::Io(_) | Error::Transport { .. } => ErrorKind::Transport,
        }
    }
}
