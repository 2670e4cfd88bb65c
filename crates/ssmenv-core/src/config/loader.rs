//! Configuration file loading and parsing

use super::ParameterOptions;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::debug;

/// Configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &["ssmenv.yaml", "ssmenv.yml", "ssmenv.json"];

impl ParameterOptions {
    /// Load options from the specified path or search the working directory
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_owned(),
            None => {
                let cwd = std::env::current_dir()?;
                let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
                    Error::invalid_config(format!("working directory is not UTF-8: {}", e))
                })?;
                Self::find_config_in(&cwd)?
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(config_path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        debug!("Loading parameter options from {}", config_path);
        Self::parse(&content, &config_path)
    }

    /// Parse options, choosing JSON or YAML by file extension
    pub fn parse(content: &str, path: &Utf8Path) -> Result<Self> {
        let options: Self = if path.extension() == Some("json") {
            serde_json::from_str(content)?
        } else {
            serde_yaml_ng::from_str(content)?
        };

        options.validate()?;
        Ok(options)
    }

    /// Find the first known configuration file in `dir`
    pub fn find_config_in(dir: &Utf8Path) -> Result<Utf8PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.exists())
            .ok_or_else(|| Error::config_not_found(dir.join(CONFIG_FILE_NAMES[0]).as_str()))
    }
}
