//! Fetch planning
//!
//! Translates `ParameterOptions` into the minimum set of remote fetches plus
//! the bindings needed to map remote results back to local keys. Planning
//! is pure: no network access happens here.
//!
//! Key naming for path-derived parameters:
//! - the suffix is the remote name with the path prefix and one leading `/` stripped
//! - entries with an empty local prefix use the suffix alone
//! - entries with a local prefix use `[prefix, local prefix, suffix]`
//! - the context key joins those segments with `/`; the environment key
//!   replaces anything outside `[A-Za-z0-9_]` with `_` and uppercases

use ssmenv_core::{ParameterOptions, Result};
use std::collections::HashSet;
use tracing::debug;

/// Maximum names accepted by a single GetParameters call
pub const MAX_NAMES_PER_CALL: usize = 10;

/// One unit of remote work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDescriptor {
    /// A batch of at most `MAX_NAMES_PER_CALL` parameter names
    ByNames { names: Vec<String> },
    /// Every parameter under `path`, starting at `next_token` when resuming
    ByPath {
        local_prefix: String,
        path: String,
        next_token: Option<String>,
    },
}

impl std::fmt::Display for FetchDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchDescriptor::ByNames { names } => {
                write!(f, "GetParameters [{}]", names.join(", "))
            }
            FetchDescriptor::ByPath {
                local_prefix, path, ..
            } if local_prefix.is_empty() => write!(f, "GetParametersByPath {}", path),
            FetchDescriptor::ByPath {
                local_prefix, path, ..
            } => write!(f, "GetParametersByPath {} (as {})", path, local_prefix),
        }
    }
}

/// Keys under which one resolved value is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalKeys {
    /// Environment variable name
    pub env_key: String,
    /// Key used for the invocation context
    pub context_key: String,
}

/// Binding from an explicitly named parameter to a local key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameBinding {
    pub local_key: String,
    pub remote_name: String,
}

impl NameBinding {
    /// Explicit names are used verbatim for both targets
    pub fn keys(&self) -> LocalKeys {
        LocalKeys {
            env_key: self.local_key.clone(),
            context_key: self.local_key.clone(),
        }
    }
}

/// Binding from a remote path prefix to derived local keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBinding {
    pub local_prefix: String,
    pub path: String,
    key_prefix: Option<String>,
}

impl PathBinding {
    pub fn new(
        local_prefix: impl Into<String>,
        path: impl Into<String>,
        key_prefix: Option<&str>,
    ) -> Self {
        let key_prefix = key_prefix
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty());
        Self {
            local_prefix: local_prefix.into(),
            path: path.into(),
            key_prefix,
        }
    }

    /// Derive local keys for a parameter listed under this path.
    ///
    /// Returns `None` when `remote_name` does not live under the path.
    pub fn keys_for(&self, remote_name: &str) -> Option<LocalKeys> {
        let suffix = self.suffix(remote_name)?;

        let mut segments: Vec<&str> = Vec::with_capacity(3);
        if !self.local_prefix.is_empty() {
            if let Some(prefix) = &self.key_prefix {
                segments.push(prefix.as_str());
            }
            segments.push(self.local_prefix.trim_matches('/'));
        }
        segments.push(suffix);

        let context_key = segments
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        let env_key = env_key(&context_key);

        Some(LocalKeys {
            env_key,
            context_key,
        })
    }

    fn suffix<'a>(&self, remote_name: &'a str) -> Option<&'a str> {
        let base = self.path.trim_end_matches('/');
        let rest = remote_name.strip_prefix(base)?;
        let suffix = if base.is_empty() {
            rest.trim_start_matches('/')
        } else {
            rest.strip_prefix('/')?
        };
        (!suffix.is_empty()).then_some(suffix)
    }
}

/// How results are mapped back to local keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Name(NameBinding),
    Path(PathBinding),
}

/// Output of planning: what to fetch, and how to name what comes back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPlan {
    pub descriptors: Vec<FetchDescriptor>,
    pub bindings: Vec<Binding>,
}

impl FetchPlan {
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Explicit name bindings, in declaration order
    pub fn name_bindings(&self) -> impl Iterator<Item = &NameBinding> {
        self.bindings.iter().filter_map(|b| match b {
            Binding::Name(binding) => Some(binding),
            Binding::Path(_) => None,
        })
    }

    /// The path binding for a given local prefix and path
    pub fn path_binding(&self, local_prefix: &str, path: &str) -> Option<&PathBinding> {
        self.bindings.iter().find_map(|b| match b {
            Binding::Path(binding)
                if binding.local_prefix == local_prefix && binding.path == path =>
            {
                Some(binding)
            }
            _ => None,
        })
    }
}

/// Compute fetch descriptors and bindings for the given options
pub fn plan(options: &ParameterOptions) -> Result<FetchPlan> {
    options.validate()?;

    let mut plan = FetchPlan::default();

    // Several local keys may point at one remote name; fetch it once.
    let mut seen = HashSet::new();
    let mut unique_names = Vec::new();
    for (local_key, remote_name) in &options.names {
        plan.bindings.push(Binding::Name(NameBinding {
            local_key: local_key.clone(),
            remote_name: remote_name.clone(),
        }));
        if seen.insert(remote_name.as_str()) {
            unique_names.push(remote_name.clone());
        }
    }

    for batch in unique_names.chunks(MAX_NAMES_PER_CALL) {
        plan.descriptors.push(FetchDescriptor::ByNames {
            names: batch.to_vec(),
        });
    }

    let mut seen_paths = HashSet::new();
    for (local_prefix, spec) in &options.paths {
        for path in spec.paths() {
            if !seen_paths.insert((local_prefix.as_str(), path)) {
                continue;
            }
            plan.bindings.push(Binding::Path(PathBinding::new(
                local_prefix.as_str(),
                path,
                options.prefix.as_deref(),
            )));
            plan.descriptors.push(FetchDescriptor::ByPath {
                local_prefix: local_prefix.clone(),
                path: path.to_string(),
                next_token: None,
            });
        }
    }

    debug!(
        "Planned {} fetches for {} bindings",
        plan.descriptors.len(),
        plan.bindings.len()
    );

    Ok(plan)
}

/// Normalize a raw key into an environment variable name
pub fn env_key(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
