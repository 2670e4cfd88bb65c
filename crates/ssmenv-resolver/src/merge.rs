//! Result assembly
//!
//! Folds fetch outcomes into a single ordered snapshot keyed by environment
//! key. Invalid parameter names abort the whole resolution; nothing partial
//! is ever produced.

use crate::planner::{FetchPlan, LocalKeys};
use crate::secure::SecureString;
use crate::store::{FetchOutcome, ParameterRecord};
use indexmap::IndexMap;
use ssmenv_core::{Error, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

/// One value bound to its local keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParameter {
    pub env_key: String,
    pub context_key: String,
    pub remote_name: String,
    pub value: SecureString,
}

/// Resolved parameters in binding order, keyed by environment key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSnapshot {
    entries: IndexMap<String, ResolvedParameter>,
}

impl ParameterSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, env_key: &str) -> Option<&ResolvedParameter> {
        self.entries.get(env_key)
    }

    /// Value for an environment key
    pub fn value(&self, env_key: &str) -> Option<&str> {
        self.entries.get(env_key).map(|p| p.value.expose())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedParameter> {
        self.entries.values()
    }

    /// Insert a binding, enforcing one remote name per environment key and
    /// per context key
    pub fn insert(&mut self, keys: LocalKeys, remote_name: &str, value: SecureString) -> Result<()> {
        if let Some(existing) = self.entries.get(&keys.env_key) {
            if existing.remote_name != remote_name {
                return Err(Error::key_collision(
                    keys.env_key,
                    existing.remote_name.clone(),
                    remote_name,
                ));
            }
            debug!("{} already bound to {}", keys.env_key, remote_name);
            return Ok(());
        }

        if let Some(existing) = self
            .entries
            .values()
            .find(|p| p.context_key == keys.context_key && p.remote_name != remote_name)
        {
            return Err(Error::key_collision(
                keys.context_key,
                existing.remote_name.clone(),
                remote_name,
            ));
        }

        self.entries.insert(
            keys.env_key.clone(),
            ResolvedParameter {
                env_key: keys.env_key,
                context_key: keys.context_key,
                remote_name: remote_name.to_string(),
                value,
            },
        );
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ParameterSnapshot {
    type Item = &'a ResolvedParameter;
    type IntoIter = indexmap::map::Values<'a, String, ResolvedParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

/// Combine fetch outcomes into a snapshot.
///
/// Explicit names come first in declaration order, then path listings in
/// fetch order. Any invalid name fails the merge with every invalid name
/// listed in the order the store reported them. A requested name missing
/// from the response without being reported invalid fails the same way.
pub fn merge(plan: &FetchPlan, outcomes: Vec<FetchOutcome>) -> Result<ParameterSnapshot> {
    let mut by_name: HashMap<String, SecureString> = HashMap::new();
    let mut invalid: Vec<String> = Vec::new();
    let mut listings: Vec<(String, String, Vec<ParameterRecord>)> = Vec::new();

    for outcome in outcomes {
        match outcome {
            FetchOutcome::Names {
                records,
                invalid: missing,
            } => {
                invalid.extend(missing);
                for record in records {
                    by_name.insert(record.name, record.value);
                }
            }
            FetchOutcome::Path {
                local_prefix,
                path,
                records,
            } => listings.push((local_prefix, path, records)),
        }
    }

    if !invalid.is_empty() {
        return Err(Error::invalid_parameters(invalid));
    }

    // A name the store neither returned nor reported is as fatal as an invalid one.
    let mut missing: Vec<String> = Vec::new();
    for binding in plan.name_bindings() {
        if !by_name.contains_key(&binding.remote_name) && !missing.contains(&binding.remote_name) {
            warn!(
                "Store returned no value for {} (bound to {})",
                binding.remote_name, binding.local_key
            );
            missing.push(binding.remote_name.clone());
        }
    }
    if !missing.is_empty() {
        return Err(Error::invalid_parameters(missing));
    }

    let mut snapshot = ParameterSnapshot::default();

    for binding in plan.name_bindings() {
        if let Some(value) = by_name.get(&binding.remote_name) {
            snapshot.insert(binding.keys(), &binding.remote_name, value.clone())?;
        }
    }

    for (local_prefix, path, records) in listings {
        let Some(binding) = plan.path_binding(&local_prefix, &path) else {
            warn!("No binding for listing of {}; ignoring {} records", path, records.len());
            continue;
        };
        for record in records {
            match binding.keys_for(&record.name) {
                Some(keys) => snapshot.insert(keys, &record.name, record.value)?,
                None => debug!("{} is not under {}; skipped", record.name, path),
            }
        }
    }

    Ok(snapshot)
}
