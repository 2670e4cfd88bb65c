//! Resolve command

use anyhow::Result;
use camino::Utf8Path;
use indexmap::IndexMap;
use ssmenv_resolver::{Engine, ParameterSnapshot};

use crate::cli::{OutputFormat, ResolveArgs};

const REDACTED: &str = "********";

pub async fn run(args: ResolveArgs, config: Option<&Utf8Path>) -> Result<()> {
    let options = super::load_options(config)?;
    let snapshot = Engine::new(options)?.resolve().await?;

    print!("{}", render(&snapshot, args.format, args.reveal)?);
    Ok(())
}

fn render(snapshot: &ParameterSnapshot, format: OutputFormat, reveal: bool) -> Result<String> {
    let value = |v: &str| if reveal { v.to_string() } else { REDACTED.to_string() };

    match format {
        OutputFormat::Env => Ok(snapshot
            .iter()
            .map(|p| format!("{}={}\n", p.env_key, shell_quote(&value(p.value.expose()))))
            .collect()),
        OutputFormat::Json => {
            let map: IndexMap<&str, String> = snapshot
                .iter()
                .map(|p| (p.env_key.as_str(), value(p.value.expose())))
                .collect();
            Ok(format!("{}\n", serde_json::to_string_pretty(&map)?))
        }
    }
}

/// Single-quote a value for POSIX shells
fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:@%+,".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}
