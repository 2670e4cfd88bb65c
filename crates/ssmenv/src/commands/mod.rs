//! CLI command implementations

pub mod exec;
pub mod plan;
pub mod resolve;

use anyhow::{Context, Result};
use camino::Utf8Path;
use ssmenv_core::ParameterOptions;

/// Load options from `--config` or the working directory
pub(crate) fn load_options(config: Option<&Utf8Path>) -> Result<ParameterOptions> {
    ParameterOptions::load(config).context("Failed to load parameter options")
}
