//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// ssmenv - AWS SSM parameters as environment variables
#[derive(Parser, Debug)]
#[command(name = "ssmenv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to ssmenv.yaml config file
    #[arg(short, long, global = true, env = "SSMENV_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the remote calls a resolution would make
    Plan(PlanArgs),

    /// Resolve parameters once and print them
    Resolve(ResolveArgs),

    /// Resolve parameters into the environment and run a command
    Exec(ExecArgs),
}

#[derive(Args, Debug)]
pub struct PlanArgs {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// KEY=value lines
    #[default]
    Env,
    /// A JSON object keyed by environment key
    Json,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Env)]
    pub format: OutputFormat,

    /// Print values instead of redacting them
    #[arg(long)]
    pub reveal: bool,
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Command and arguments to run
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub command: Vec<String>,
}
