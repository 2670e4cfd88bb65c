//! Plan command

use anyhow::Result;
use camino::Utf8Path;
use ssmenv_resolver::Engine;

use crate::cli::PlanArgs;

pub fn run(_args: PlanArgs, config: Option<&Utf8Path>) -> Result<()> {
    let options = super::load_options(config)?;
    let engine = Engine::new(options)?;

    for line in describe(&engine) {
        println!("{}", line);
    }
    Ok(())
}

/// Remote calls in the order a resolution makes them, then the cache and
/// target settings
fn describe(engine: &Engine) -> Vec<String> {
    let options = engine.options();
    let mut lines = Vec::new();

    if let Some((_, role_arn)) = options.sts_options.as_ref().and_then(|s| s.elevation()) {
        lines.push(format!("AssumeRole {}", role_arn));
    }

    if engine.plan().is_empty() {
        lines.push("No parameters configured".to_string());
        return lines;
    }

    lines.extend(engine.plan().descriptors.iter().map(ToString::to_string));

    lines.push(match (options.cache, options.cache_expiry_in_millis) {
        (false, _) => "cache: off".to_string(),
        (true, None) => "cache: on, no expiry".to_string(),
        (true, Some(ms)) => format!("cache: on, expires after {}ms", ms),
    });
    lines.push(format!(
        "targets: env{}",
        if options.set_to_context { ", context" } else { "" }
    ));

    lines
}
