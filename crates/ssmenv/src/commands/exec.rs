//! Exec command

use anyhow::{Context, Result};
use camino::Utf8Path;
use ssmenv_resolver::{Engine, InvocationContext};
use tokio::process::Command;
use tracing::debug;

use crate::cli::ExecArgs;

pub async fn run(args: ExecArgs, config: Option<&Utf8Path>) -> Result<()> {
    let options = super::load_options(config)?;
    let engine = Engine::new(options)?;
    engine.invoke(InvocationContext::new()).await?;

    let (program, rest) = args
        .command
        .split_first()
        .context("No command given")?;

    debug!("Running {}", program);
    let status = Command::new(program)
        .args(rest)
        .status()
        .await
        .with_context(|| format!("Failed to run {}", program))?;

    std::process::exit(status.code().unwrap_or(1));
}
