//! ssmenv CLI - resolve SSM parameters for a command
//!
//! This is the main entry point for the ssmenv command-line interface.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Plan(args) => commands::plan::run(args, cli.config.as_deref()),
        Commands::Resolve(args) => commands::resolve::run(args, cli.config.as_deref()).await,
        Commands::Exec(args) => commands::exec::run(args, cli.config.as_deref()).await,
    }
}

/// Initialize tracing with appropriate verbosity
///
/// Logs go to stderr; stdout is reserved for command output.
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
